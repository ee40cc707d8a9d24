use rustc_hash::FxHashMap;

use crate::{Error, Result, Shape, NAN, V};

/// A row-major 2D float buffer: rows are time steps, columns are series.
///
/// Labels are opaque metadata; kernels never read them. Shape-preserving
/// operations carry both label sets along, reductions keep the labels of
/// the surviving axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    rows: usize,
    cols: usize,
    values: Vec<V>,
    row_labels: Option<Vec<String>>,
    col_labels: Option<Vec<String>>,
    col_positions: Option<FxHashMap<String, usize>>,
}

impl Frame {
    /// Build a frame from a row-major buffer of length `rows * cols`.
    pub fn new(rows: usize, cols: usize, values: Vec<V>) -> Result<Frame> {
        if rows == 0 || cols == 0 {
            return Err(Error::Empty);
        }
        assert_eq!(values.len(), rows * cols, "buffer length != rows * cols");
        Ok(Frame {
            rows,
            cols,
            values,
            row_labels: None,
            col_labels: None,
            col_positions: None,
        })
    }

    /// Build a frame from nested rows. All rows must have equal length.
    pub fn from_rows(rows: Vec<Vec<V>>) -> Result<Frame> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(Error::Empty);
        }
        let mut values = Vec::with_capacity(height * width);
        for row in &rows {
            assert_eq!(row.len(), width, "ragged rows");
            values.extend_from_slice(row);
        }
        Frame::new(height, width, values)
    }

    /// A frame filled with one value.
    pub fn full(rows: usize, cols: usize, value: V) -> Result<Frame> {
        Frame::new(rows, cols, vec![value; rows * cols])
    }

    /// An all-NaN frame.
    pub fn nan(rows: usize, cols: usize) -> Result<Frame> {
        Frame::full(rows, cols, NAN)
    }

    /// A 1x1 frame holding a scalar, broadcast-compatible with any shape.
    pub fn scalar(value: V) -> Frame {
        Frame::new(1, 1, vec![value]).unwrap()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> Shape {
        (self.rows, self.cols)
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> V {
        self.values[row * self.cols + col]
    }

    /// A row as a contiguous slice.
    #[inline]
    pub fn row(&self, row: usize) -> &[V] {
        &self.values[row * self.cols..(row + 1) * self.cols]
    }

    /// Gather one (strided) column into a contiguous vector.
    pub fn column(&self, col: usize) -> Vec<V> {
        assert!(col < self.cols);
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }

    /// Same shape and labels, new buffer.
    pub fn with_values(&self, values: Vec<V>) -> Frame {
        assert_eq!(values.len(), self.values.len());
        Frame {
            rows: self.rows,
            cols: self.cols,
            values,
            row_labels: self.row_labels.clone(),
            col_labels: self.col_labels.clone(),
            col_positions: self.col_positions.clone(),
        }
    }

    /// A `(1, cols)` reduction of this frame; column labels survive.
    pub fn reduce_rows(&self, values: Vec<V>) -> Frame {
        assert_eq!(values.len(), self.cols);
        Frame {
            rows: 1,
            cols: self.cols,
            values,
            row_labels: None,
            col_labels: self.col_labels.clone(),
            col_positions: self.col_positions.clone(),
        }
    }

    /// A `(rows, 1)` reduction of this frame; row labels survive.
    pub fn reduce_cols(&self, values: Vec<V>) -> Frame {
        assert_eq!(values.len(), self.rows);
        Frame {
            rows: self.rows,
            cols: 1,
            values,
            row_labels: self.row_labels.clone(),
            col_labels: None,
            col_positions: None,
        }
    }

    pub fn with_row_labels(mut self, labels: Vec<String>) -> Frame {
        assert_eq!(labels.len(), self.rows);
        self.row_labels = Some(labels);
        self
    }

    pub fn with_col_labels(mut self, labels: Vec<String>) -> Frame {
        assert_eq!(labels.len(), self.cols);
        self.col_positions = Some(
            labels
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect(),
        );
        self.col_labels = Some(labels);
        self
    }

    pub fn row_labels(&self) -> Option<&[String]> {
        self.row_labels.as_deref()
    }

    pub fn col_labels(&self) -> Option<&[String]> {
        self.col_labels.as_deref()
    }

    /// Index of a labeled column, if column labels are attached.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.col_positions.as_ref()?.get(name).copied()
    }
}
