//! Fixed-size values that can be cached by a [crate::Window].
//!
//! Records are stored packed (no framing, no checksums) and all multi-byte
//! primitives are little-endian, so a store written by dumping a native array
//! of integers on common hardware can be scanned directly.

use bytes::{Buf, BufMut};

/// A value with a constant encoded size.
///
/// [Record::SIZE] must be a power of two. This is not checked here but when a
/// [crate::Window] is constructed over the record type.
pub trait Record: Copy + Default + Send + Sync + 'static {
    /// Length of the encoded record in bytes.
    const SIZE: usize;

    /// Decode a record from the front of `buf`.
    ///
    /// `buf` is guaranteed to hold at least [Record::SIZE] bytes.
    fn read(buf: &mut impl Buf) -> Self;

    /// Encode the record into `buf`.
    fn write(&self, buf: &mut impl BufMut);
}

macro_rules! impl_numeric {
    ($type:ty, $read_method:ident, $write_method:ident) => {
        impl Record for $type {
            const SIZE: usize = std::mem::size_of::<$type>();

            #[inline]
            fn read(buf: &mut impl Buf) -> Self {
                buf.$read_method()
            }

            #[inline]
            fn write(&self, buf: &mut impl BufMut) {
                buf.$write_method(*self);
            }
        }
    };
}

impl_numeric!(u8, get_u8, put_u8);
impl_numeric!(u16, get_u16_le, put_u16_le);
impl_numeric!(u32, get_u32_le, put_u32_le);
impl_numeric!(u64, get_u64_le, put_u64_le);
impl_numeric!(i8, get_i8, put_i8);
impl_numeric!(i16, get_i16_le, put_i16_le);
impl_numeric!(i32, get_i32_le, put_i32_le);
impl_numeric!(i64, get_i64_le, put_i64_le);
impl_numeric!(f32, get_f32_le, put_f32_le);
impl_numeric!(f64, get_f64_le, put_f64_le);

impl<const N: usize> Record for [u8; N]
where
    [u8; N]: Default,
{
    const SIZE: usize = N;

    #[inline]
    fn read(buf: &mut impl Buf) -> Self {
        let mut out = [0u8; N];
        buf.copy_to_slice(&mut out);
        out
    }

    #[inline]
    fn write(&self, buf: &mut impl BufMut) {
        buf.put_slice(self);
    }
}
