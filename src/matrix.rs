use std::sync::Arc;

use qm_expr::{execute_plan, BinaryOp, Conversion, Expr, LazyFrame, Side, UnaryOp};
use qm_kernels::broadcast_shape;
use qm_types::{Error, Frame, Result, Shape, V};

use crate::builders::{Aggregate, Converter, Window};

/// A float matrix plus its pending expression plan.
///
/// Matrices are value types: every builder call returns a new matrix that
/// shares the input buffer and carries the extended plan. Shapes and window
/// parameters are validated when a node is pushed; everything else
/// surfaces at [`collect`](Matrix::collect).
#[derive(Debug, Clone)]
pub struct Matrix {
    frame: Arc<Frame>,
    plan: Vec<Expr>,
    /// Shape after the pending plan runs; reductions shrink it.
    shape: Shape,
}

impl Matrix {
    pub fn new(frame: Frame) -> Matrix {
        let shape = frame.shape();
        Matrix {
            frame: Arc::new(frame),
            plan: Vec::new(),
            shape,
        }
    }

    pub fn from_rows(rows: Vec<Vec<V>>) -> Result<Matrix> {
        Ok(Matrix::new(Frame::from_rows(rows)?))
    }

    /// Rows of the matrix this plan will produce.
    pub fn rows(&self) -> usize {
        self.shape.0
    }

    /// Columns of the matrix this plan will produce.
    pub fn cols(&self) -> usize {
        self.shape.1
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn is_lazy(&self) -> bool {
        !self.plan.is_empty()
    }

    /// The materialized frame. Fails loudly while a plan is pending.
    pub fn frame(&self) -> Result<&Frame> {
        if self.is_lazy() {
            return Err(Error::Lazy);
        }
        Ok(&self.frame)
    }

    /// The raw row-major buffer; same laziness contract as [`frame`](Matrix::frame).
    pub fn values(&self) -> Result<&[V]> {
        Ok(self.frame()?.values())
    }

    /// Run the pending plan and return a matrix with an empty one.
    ///
    /// With no pending plan this is a cheap handle to the same immutable
    /// buffer.
    pub fn collect(&self) -> Result<Matrix> {
        if self.plan.is_empty() {
            return Ok(self.clone());
        }
        Ok(Matrix::new(execute_plan(&self.frame, &self.plan)?))
    }

    pub(crate) fn as_lazy(&self) -> LazyFrame {
        LazyFrame {
            frame: Arc::clone(&self.frame),
            plan: self.plan.clone(),
        }
    }

    pub(crate) fn push(&self, node: Expr) -> Matrix {
        self.push_shaped(node, self.shape)
    }

    pub(crate) fn push_shaped(&self, node: Expr, shape: Shape) -> Matrix {
        let mut plan = self.plan.clone();
        plan.push(node);
        Matrix {
            frame: Arc::clone(&self.frame),
            plan,
            shape,
        }
    }

    fn binary(&self, other: &Matrix, op: BinaryOp) -> Result<Matrix> {
        let shape = broadcast_shape(self.shape, other.shape)?;
        Ok(self.push_shaped(
            Expr::Binary {
                op,
                rhs: other.as_lazy(),
            },
            shape,
        ))
    }

    pub fn add(&self, other: &Matrix) -> Result<Matrix> {
        self.binary(other, BinaryOp::Add)
    }

    pub fn sub(&self, other: &Matrix) -> Result<Matrix> {
        self.binary(other, BinaryOp::Sub)
    }

    pub fn mul(&self, other: &Matrix) -> Result<Matrix> {
        self.binary(other, BinaryOp::Mul)
    }

    pub fn div(&self, other: &Matrix) -> Result<Matrix> {
        self.binary(other, BinaryOp::Div)
    }

    fn scalar(&self, op: BinaryOp, side: Side, value: V) -> Matrix {
        self.push(Expr::ScalarBinary { op, side, value })
    }

    pub fn add_scalar(&self, by: V) -> Matrix {
        self.scalar(BinaryOp::Add, Side::Right, by)
    }

    pub fn sub_scalar(&self, by: V) -> Matrix {
        self.scalar(BinaryOp::Sub, Side::Right, by)
    }

    pub fn mul_scalar(&self, by: V) -> Matrix {
        self.scalar(BinaryOp::Mul, Side::Right, by)
    }

    pub fn div_scalar(&self, by: V) -> Matrix {
        self.scalar(BinaryOp::Div, Side::Right, by)
    }

    /// Inverse scalar division: `by / x`.
    pub fn target_scalar(&self, by: V) -> Matrix {
        self.scalar(BinaryOp::Div, Side::Left, by)
    }

    pub fn sign(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::Sign))
    }

    pub fn abs(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::Abs))
    }

    pub fn sqrt(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::Sqrt))
    }

    pub fn neg(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::Neg))
    }

    /// Clip into `[-limit, limit]`.
    pub fn clip(&self, limit: V) -> Matrix {
        self.push(Expr::Unary(UnaryOp::Clip(limit)))
    }

    /// Keep the positive part of the signal, zero elsewhere.
    pub fn long_bias(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::LongBias))
    }

    /// Keep the negative part of the signal, zero elsewhere.
    pub fn short_bias(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::ShortBias))
    }

    /// Shift rows down (`k > 0`, leading rows NaN) or up (`k < 0`).
    pub fn shift(&self, k: isize) -> Matrix {
        self.push(Expr::Unary(UnaryOp::Shift(k)))
    }

    /// Rank each row across columns into [-1, +1].
    pub fn cross_rank(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::CrossRank))
    }

    /// NaN -> 0.
    pub fn fill_nan(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::FillZero))
    }

    /// Propagate the next observation backwards over NaN gaps.
    pub fn backfill(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::Backfill))
    }

    /// Propagate the previous observation forwards over NaN gaps.
    pub fn forward_fill(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::ForwardFill))
    }

    /// Replace NaN with the column median.
    pub fn fill_by_median(&self) -> Matrix {
        self.push(Expr::Unary(UnaryOp::FillMedian))
    }

    pub(crate) fn push_convert(&self, kind: Conversion) -> Matrix {
        self.push(Expr::Unary(UnaryOp::Convert(kind)))
    }

    fn check_window(&self, len: usize, min_len: usize) -> Result<()> {
        let rows = self.rows();
        if len < 1 || min_len < 1 || min_len > len || len > rows {
            return Err(Error::BadWindow { len, min_len, rows });
        }
        Ok(())
    }

    /// A trailing window of `len` rows requiring `len` observations.
    pub fn rolling(&self, len: usize) -> Result<Window<'_>> {
        self.window(len, len)
    }

    /// A trailing window with an explicit observation floor.
    pub fn window(&self, len: usize, min_len: usize) -> Result<Window<'_>> {
        self.check_window(len, min_len)?;
        Ok(Window::new(self, len, min_len))
    }

    /// A window spanning the whole history, emitting once `min_len`
    /// observations have accrued.
    pub fn expanding(&self, min_len: usize) -> Result<Window<'_>> {
        self.window(self.rows(), min_len)
    }

    /// Whole-column reductions, shape `(1, cols)`.
    pub fn agg(&self) -> Aggregate<'_> {
        Aggregate::columns(self)
    }

    /// Whole-row reductions, shape `(rows, 1)`.
    pub fn agg_rows(&self) -> Aggregate<'_> {
        Aggregate::rows(self)
    }

    /// Return-space conversions.
    pub fn convert(&self) -> Converter<'_> {
        Converter::new(self)
    }
}

#[cfg(test)]
mod tests {
    use qm_types::NAN;

    use super::*;

    fn ramp() -> Matrix {
        Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap()
    }

    #[test]
    fn values_fail_until_collected() {
        let lazy = ramp().abs();
        assert!(lazy.is_lazy());
        assert_eq!(lazy.values(), Err(Error::Lazy));
        let done = lazy.collect().unwrap();
        assert_eq!(done.values().unwrap()[0], 1.0);
    }

    #[test]
    fn collect_of_eager_matrix_is_identity() {
        let m = ramp();
        let c = m.collect().unwrap();
        assert_eq!(c.values().unwrap(), m.values().unwrap());
    }

    #[test]
    fn builders_do_not_mutate_the_parent() {
        let m = ramp();
        let _child = m.mul_scalar(10.0);
        assert!(!m.is_lazy());
        assert_eq!(m.values().unwrap()[0], 1.0);
    }

    #[test]
    fn shape_checks_happen_at_chain_time() {
        let m = ramp();
        let other = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0]]).unwrap();
        assert!(matches!(
            m.add(&other),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn agg_operand_broadcasts_in_chain_arithmetic() {
        let m = ramp();
        let demeaned = m.sub(&m.agg().mean()).unwrap().collect().unwrap();
        assert_eq!(demeaned.shape(), (3, 2));
        assert_eq!(demeaned.frame().unwrap().column(0), vec![-2.0, 0.0, 2.0]);
    }

    #[test]
    fn window_params_validated_eagerly() {
        let m = ramp();
        assert!(matches!(m.rolling(4), Err(Error::BadWindow { .. })));
        assert!(matches!(m.window(2, 3), Err(Error::BadWindow { .. })));
        assert!(matches!(m.window(2, 0), Err(Error::BadWindow { .. })));
        assert!(m.rolling(3).is_ok());
    }

    #[test]
    fn lazy_rhs_is_collected_recursively() {
        let m = ramp();
        let rhs = ramp().shift(1);
        let out = m.sub(&rhs).unwrap().collect().unwrap();
        let f = out.frame().unwrap();
        assert!(f.get(0, 0).is_nan());
        assert_eq!(f.get(1, 0), 2.0);
        assert_eq!(f.get(2, 1), 2.0);
    }

    #[test]
    fn nan_survives_scalar_chains() {
        let m = Matrix::from_rows(vec![vec![NAN, 1.0]]).unwrap();
        let out = m.add_scalar(5.0).mul_scalar(2.0).collect().unwrap();
        assert!(out.frame().unwrap().get(0, 0).is_nan());
        assert_eq!(out.frame().unwrap().get(0, 1), 12.0);
    }
}
