//! BGRA pixel storage.
//!
//! All image data inside the pipeline is 8 bits per channel in blue, green,
//! red, alpha byte order with straight (non-premultiplied) alpha.

/// Bytes per BGRA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// A single BGRA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Bgra {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

impl Bgra {
    /// Fully transparent black.
    pub const TRANSPARENT: Bgra = Bgra::new(0, 0, 0, 0);

    /// Creates a pixel from channels in storage order.
    #[inline]
    pub const fn new(b: u8, g: u8, r: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Creates a pixel from channels in RGBA order.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    #[inline]
    fn read(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    #[inline]
    fn write(self, bytes: &mut [u8]) {
        bytes[0] = self.b;
        bytes[1] = self.g;
        bytes[2] = self.r;
        bytes[3] = self.a;
    }
}

/// A flat, row-major BGRA pixel buffer with a fixed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Creates a zero-filled (fully transparent) buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * BYTES_PER_PIXEL],
        }
    }

    /// Wraps existing BGRA bytes.
    ///
    /// Returns `None` if the byte count does not match the dimensions.
    pub fn from_bgra(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == width as usize * height as usize * BYTES_PER_PIXEL).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Creates a buffer by evaluating `f` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Bgra) -> Self {
        let mut buffer = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                buffer.set(x, y, f(x, y));
            }
        }
        buffer
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.stride() + x as usize * BYTES_PER_PIXEL
    }

    /// Reads the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the buffer.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Bgra {
        debug_assert!(x < self.width);
        pixel_in_row(self.row(y), x)
    }

    /// Reads the pixel at `(x, y)`, or `None` outside the buffer.
    pub fn checked_get(&self, x: u32, y: u32) -> Option<Bgra> {
        (x < self.width && y < self.height).then(|| self.get(x, y))
    }

    /// Writes the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the buffer.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, pixel: Bgra) {
        let offset = self.offset(x, y);
        pixel.write(&mut self.data[offset..offset + BYTES_PER_PIXEL]);
    }

    /// One row of raw BGRA bytes.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.data[start..start + self.stride()]
    }

    /// One mutable row of raw BGRA bytes.
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let stride = self.stride();
        let start = y as usize * stride;
        &mut self.data[start..start + stride]
    }

    /// All rows as mutable raw BGRA bytes.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// All raw BGRA bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Reads one pixel out of a raw BGRA row.
#[inline]
fn pixel_in_row(row: &[u8], x: u32) -> Bgra {
    let offset = x as usize * BYTES_PER_PIXEL;
    Bgra::read(&row[offset..offset + BYTES_PER_PIXEL])
}

/// Writes one pixel into a raw BGRA row.
#[inline]
pub(crate) fn set_pixel_in_row(row: &mut [u8], x: u32, pixel: Bgra) {
    let offset = x as usize * BYTES_PER_PIXEL;
    pixel.write(&mut row[offset..offset + BYTES_PER_PIXEL]);
}

/// Swaps the red and blue channels of every 4-byte pixel in place.
///
/// Converts RGBA to BGRA and back.
pub(crate) fn swap_red_blue(bytes: &mut [u8]) {
    for px in bytes.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.swap(0, 2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_transparent() {
        let buf = PixelBuffer::new(3, 2);
        assert_eq!(buf.as_bytes().len(), 24);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(buf.get(2, 1), Bgra::TRANSPARENT);
    }

    #[test]
    fn test_set_get_storage_order() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(1, 1, Bgra::rgba(10, 20, 30, 40));

        assert_eq!(buf.get(1, 1), Bgra::new(30, 20, 10, 40));
        assert_eq!(&buf.as_bytes()[12..16], &[30, 20, 10, 40]);
    }

    #[test]
    fn test_from_bgra_checks_length() {
        assert!(PixelBuffer::from_bgra(2, 2, vec![0; 16]).is_some());
        assert!(PixelBuffer::from_bgra(2, 2, vec![0; 15]).is_none());
    }

    #[test]
    fn test_checked_get_out_of_bounds() {
        let buf = PixelBuffer::new(2, 2);
        assert!(buf.checked_get(1, 1).is_some());
        assert!(buf.checked_get(2, 0).is_none());
        assert!(buf.checked_get(0, 2).is_none());
    }

    #[test]
    fn test_rows() {
        let mut buf = PixelBuffer::from_fn(2, 3, |x, y| Bgra::new(x as u8, y as u8, 0, 255));
        assert_eq!(buf.row(2), &[0, 2, 0, 255, 1, 2, 0, 255]);

        buf.row_mut(0).fill(9);
        assert_eq!(buf.get(1, 0), Bgra::new(9, 9, 9, 9));
        assert_eq!(pixel_in_row(buf.row(1), 1), Bgra::new(1, 1, 0, 255));
    }

    #[test]
    fn test_swap_red_blue() {
        let mut bytes = vec![1, 2, 3, 4, 5, 6, 7, 8];
        swap_red_blue(&mut bytes);
        assert_eq!(bytes, vec![3, 2, 1, 4, 7, 6, 5, 8]);
    }
}
