/// An RGBA8 raster (straight alpha, row-major, 4 bytes per pixel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; (width as usize) * (height as usize) * 4],
            width,
            height,
        }
    }

    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &crate::Color) -> Self {
        let pixel = color.to_rgba8();
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 4)
            .collect();
        Self {
            data,
            width,
            height,
        }
    }

    /// Wrap existing RGBA8 pixel data. Returns None if the length does not
    /// match the dimensions.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        (data.len() == expected).then_some(Self {
            data,
            width,
            height,
        })
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// (width, height) in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| ((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let o = self.offset(x, y)?;
        Some([
            self.data[o],
            self.data[o + 1],
            self.data[o + 2],
            self.data[o + 3],
        ])
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(o) = self.offset(x, y) {
            self.data[o..o + 4].copy_from_slice(&rgba);
        }
    }

    /// Alpha-composite `src` on top of `self` with its top-left corner at
    /// (dx, dy). Parts of `src` that fall outside `self` are clipped, so
    /// negative offsets are fine.
    pub fn composite_over(&mut self, src: &FrameBuffer, dx: i32, dy: i32) {
        // Visible source window, in source coordinates.
        let x0 = (-dx).max(0) as i64;
        let y0 = (-dy).max(0) as i64;
        let x1 = (src.width as i64).min(self.width as i64 - dx as i64);
        let y1 = (src.height as i64).min(self.height as i64 - dy as i64);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let src_stride = src.width as usize * 4;
        let dst_stride = self.width as usize * 4;
        let row_len = (x1 - x0) as usize * 4;

        for sy in y0..y1 {
            let ty = (sy + dy as i64) as usize;
            let tx = (x0 + dx as i64) as usize;
            let s_start = sy as usize * src_stride + x0 as usize * 4;
            let d_start = ty * dst_stride + tx * 4;

            let src_row = &src.data[s_start..s_start + row_len];
            let dst_row = &mut self.data[d_start..d_start + row_len];

            for (s, d) in src_row.chunks_exact(4).zip(dst_row.chunks_exact_mut(4)) {
                blend_pixel_over(s, d);
            }
        }
    }
}

/// Source-over blend of one straight-alpha RGBA pixel onto another, in
/// integer arithmetic.
fn blend_pixel_over(s: &[u8], d: &mut [u8]) {
    let sa = s[3] as u32;
    match sa {
        0 => return,
        255 => {
            d.copy_from_slice(s);
            return;
        }
        _ => {}
    }

    let da = d[3] as u32;
    // Destination weight scaled by 255: da * (1 - sa).
    let dw = da * (255 - sa);
    let out_a_255 = sa * 255 + dw;
    if out_a_255 == 0 {
        return;
    }

    for c in 0..3 {
        let v = (s[c] as u32 * sa * 255 + d[c] as u32 * dw) / out_a_255;
        d[c] = v.min(255) as u8;
    }
    d[3] = ((out_a_255 + 127) / 255).min(255) as u8;
}
