//! Scanline-parallel rendering.
//!
//! Workers pull row indices from a shared cursor, shade whole rows into
//! private buffers and send them back over a channel. The calling thread
//! reassembles rows strictly in order, so the destination buffer is only
//! ever written from one thread.

use crate::frame::FrameLayout;
use crate::{RenderError, RenderResult};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

/// One fully shaded row of packed pixels.
#[derive(Debug, Clone)]
pub struct RowResult {
    pub row: u32,
    pub pixels: Vec<u8>,
}

/// Seed for the generator that shades `row`.
///
/// Rows are reseeded independently so the image does not depend on which
/// worker rendered which row.
#[inline]
pub fn row_seed(base: u64, row: u32) -> u64 {
    base ^ (row as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Writes rows into the destination buffer in increasing row order.
///
/// Rows that arrive early wait in a pending map until every row above them
/// has been written.
pub struct RowAssembler<'a> {
    target: &'a mut [u8],
    layout: FrameLayout,
    pending: BTreeMap<u32, Vec<u8>>,
    next_row: u32,
}

impl<'a> RowAssembler<'a> {
    /// Fails if `target` is too small for `layout`.
    pub fn new(target: &'a mut [u8], layout: FrameLayout) -> RenderResult<Self> {
        layout.check_buffer(target.len())?;
        Ok(Self {
            target,
            layout,
            pending: BTreeMap::new(),
            next_row: 0,
        })
    }

    /// Accept a finished row. Returns false for duplicates, out-of-range
    /// rows and rows of the wrong length, which are dropped.
    pub fn push(&mut self, result: RowResult) -> bool {
        let RowResult { row, pixels } = result;
        if row < self.next_row
            || row >= self.layout.height()
            || pixels.len() != self.layout.row_bytes()
            || self.pending.contains_key(&row)
        {
            return false;
        }

        self.pending.insert(row, pixels);
        self.flush();
        true
    }

    fn flush(&mut self) {
        while let Some(pixels) = self.pending.remove(&self.next_row) {
            let offset = self.layout.row_offset(self.next_row);
            self.target[offset..offset + pixels.len()].copy_from_slice(&pixels);
            self.next_row += 1;
        }
    }

    /// Rows written to the destination so far.
    pub fn rows_written(&self) -> u32 {
        self.next_row
    }

    /// Rows received but still waiting for an earlier row.
    pub fn rows_pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_complete(&self) -> bool {
        self.next_row == self.layout.height()
    }
}

/// Shade every pixel of the frame on a pool of `threads` workers.
///
/// `threads == 0` uses the available parallelism. `shade` receives the
/// pixel coordinate and the row's generator and returns B,G,R bytes.
/// Stride padding in `target` is left untouched.
pub fn render_rows<F>(
    target: &mut [u8],
    layout: &FrameLayout,
    threads: usize,
    seed: u64,
    shade: F,
) -> RenderResult<()>
where
    F: Fn(u32, u32, &mut dyn RngCore) -> [u8; 3] + Sync,
{
    let height = layout.height();
    let mut assembler = RowAssembler::new(target, *layout)?;

    let thread_count = match threads {
        0 => thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
        n => n,
    }
    .min(height as usize);

    log::debug!("Shading {} rows on {} workers", height, thread_count);

    let next_row = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<RowResult>();
    let shade = &shade;

    thread::scope(|scope| {
        for _ in 0..thread_count {
            let next_row = &next_row;
            let tx = tx.clone();
            scope.spawn(move || loop {
                let row = next_row.fetch_add(1, Ordering::Relaxed);
                if row >= height as usize {
                    break;
                }
                let row = row as u32;

                let mut rng = StdRng::seed_from_u64(row_seed(seed, row));
                let mut pixels = vec![0; layout.row_bytes()];
                for x in 0..layout.width() {
                    layout.write_pixel(&mut pixels, x, shade(x, row, &mut rng));
                }

                if tx.send(RowResult { row, pixels }).is_err() {
                    break;
                }
            });
        }

        drop(tx);
        for result in rx.iter() {
            assembler.push(result);
            if assembler.is_complete() {
                break;
            }
        }
    });

    if !assembler.is_complete() {
        return Err(RenderError::IncompleteFrame {
            received: assembler.rows_written(),
            expected: height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(_x: u32, _y: u32, _rng: &mut dyn RngCore) -> [u8; 3] {
        [10, 20, 30]
    }

    #[test]
    fn test_constant_shader_independent_of_workers() {
        let layout = FrameLayout::new(17, 23, 17 * 4 + 8, 4).unwrap();

        let mut single = layout.allocate();
        render_rows(&mut single, &layout, 1, 42, constant).unwrap();

        let mut many = layout.allocate();
        render_rows(&mut many, &layout, 8, 42, constant).unwrap();

        assert_eq!(single, many);
        assert_eq!(&single[0..4], &[10, 20, 30, PAD]);
    }

    const PAD: u8 = crate::frame::PAD_BYTE;

    #[test]
    fn test_random_shader_independent_of_workers() {
        let layout = FrameLayout::packed(31, 19, 3).unwrap();
        let shade = |x: u32, y: u32, rng: &mut dyn RngCore| {
            let r = rng.next_u32().to_le_bytes();
            [r[0], (x as u8).wrapping_add(r[1]), (y as u8).wrapping_add(r[2])]
        };

        let mut single = layout.allocate();
        render_rows(&mut single, &layout, 1, 7, shade).unwrap();

        let mut many = layout.allocate();
        render_rows(&mut many, &layout, 5, 7, shade).unwrap();

        assert_eq!(single, many);

        let mut reseeded = layout.allocate();
        render_rows(&mut reseeded, &layout, 5, 8, shade).unwrap();
        assert_ne!(single, reseeded);
    }

    #[test]
    fn test_stride_padding_untouched() {
        let layout = FrameLayout::new(4, 3, 16, 3).unwrap();
        let mut buffer = vec![0xAB; layout.required_len()];
        render_rows(&mut buffer, &layout, 2, 0, constant).unwrap();

        for row in 0..3u32 {
            let offset = layout.row_offset(row);
            assert_eq!(&buffer[offset..offset + 3], &[10, 20, 30]);
            if row < 2 {
                assert!(buffer[offset + 12..offset + 16].iter().all(|&b| b == 0xAB));
            }
        }
    }

    #[test]
    fn test_assembler_orders_rows() {
        let layout = FrameLayout::packed(2, 3, 3).unwrap();
        let mut buffer = layout.allocate();

        {
            let mut assembler = RowAssembler::new(&mut buffer, layout).unwrap();
            let row = |row: u32| RowResult {
                row,
                pixels: vec![row as u8 + 1; 6],
            };

            assert!(assembler.push(row(2)));
            assert_eq!(assembler.rows_written(), 0);
            assert_eq!(assembler.rows_pending(), 1);

            // Duplicate and out-of-range rows are rejected
            assert!(!assembler.push(row(2)));
            assert!(!assembler.push(row(3)));

            assert!(assembler.push(row(0)));
            assert_eq!(assembler.rows_written(), 1);

            assert!(assembler.push(row(1)));
            assert!(assembler.is_complete());
            assert!(!assembler.push(row(0)));
        }

        assert_eq!(buffer, vec![1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 3, 3, 3, 3, 3, 3]);
    }

    #[test]
    fn test_small_buffer_rejected() {
        let layout = FrameLayout::packed(4, 4, 3).unwrap();
        let mut buffer = vec![0; 10];
        assert_eq!(
            render_rows(&mut buffer, &layout, 1, 0, constant),
            Err(RenderError::BufferTooSmall { actual: 10, required: 48 })
        );
    }
}
