extern crate nalgebra as na;

use std::cmp::Ordering;
use na::{Matrix2xX, Vector2};
use crate::Float;

#[derive(Debug,Clone,Copy)]
pub struct KeypointAndIndex {
    pub measurement: Vector2<Float>,
    pub index: usize
}

/**
 * Keypoints sorted by their y coordinate together with a per image row table holding the first sorted position
 * whose y coordinate is >= that row. Any band of rows maps to a contiguous slice in O(1).
 */
#[derive(Debug,Clone)]
pub struct KeypointRowLookup {
    keypoints_by_y: Vec<KeypointAndIndex>,
    corner_row_lut: Vec<usize>
}

impl KeypointRowLookup {
    pub fn new(keypoint_measurements: &Matrix2xX<Float>, image_height: usize) -> KeypointRowLookup {
        let number_of_keypoints = keypoint_measurements.ncols();
        let mut keypoints_by_y = (0..number_of_keypoints)
            .map(|index| KeypointAndIndex{measurement: keypoint_measurements.column(index).into_owned(), index})
            .collect::<Vec<KeypointAndIndex>>();
        keypoints_by_y.sort_by(|a,b| a.measurement[1].partial_cmp(&b.measurement[1]).unwrap_or(Ordering::Equal));

        // One extra entry so that the band ending on the last row has an end offset.
        let mut corner_row_lut = Vec::<usize>::with_capacity(image_height+1);
        let mut v = 0;
        for y in 0..=image_height {
            while v < number_of_keypoints && (y as Float) > keypoints_by_y[v].measurement[1] {
                v += 1;
            }
            corner_row_lut.push(v);
        }

        KeypointRowLookup{keypoints_by_y, corner_row_lut}
    }

    pub fn get_image_height(&self) -> usize {
        self.corner_row_lut.len() - 1
    }

    /**
     * All keypoints with top_row <= y < bottom_row + 1. Rows are clamped to the image.
     */
    pub fn rows(&self, top_row: usize, bottom_row: usize) -> &[KeypointAndIndex] {
        let height = self.get_image_height();
        let begin = self.corner_row_lut[top_row.min(height)];
        let end = self.corner_row_lut[(bottom_row+1).min(height)];
        match begin < end {
            true => &self.keypoints_by_y[begin..end],
            false => &[]
        }
    }

    /**
     * Row band of half width radius around y, or None if the band lies completely outside the image.
     */
    pub fn row_band(&self, y: Float, radius: Float) -> Option<(usize,usize)> {
        let last_row = self.get_image_height() as i64 - 1;
        let top = (y + 0.5 - radius).floor() as i64;
        let bottom = (y + 0.5 + radius).floor() as i64;
        match (top, bottom) {
            (_, b) if b < 0 => None,
            (t, _) if t > last_row => None,
            (t, b) => Some((t.max(0) as usize, b.min(last_row) as usize))
        }
    }
}
