// ============================================================
// Layer 4 — NPY Decoder
// ============================================================
// Decodes a single .npy payload (one member of an .npz zip)
// into a Parameter of f32 values.
//
// npyz does the format work: magic, version 1/2/3 headers,
// the header dict, and typed element reads in either byte
// order. What is left for us:
//
//   1. Pick the element type to read from the header's dtype,
//      then cast to f32 (same as `array.astype(np.float32)`).
//   2. Fortran-ordered arrays come back in memory order; wrap
//      them in a column-major ndarray and iterate it, which
//      yields the row-major order `ndarray.flatten()` gives.

use half::f16;
use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use npyz::{DType, NpyFile, Order, TypeChar};
use std::io::Read;
use thiserror::Error;

use crate::domain::parameter::Parameter;

/// Everything that can go wrong decoding one .npy payload.
#[derive(Debug, Error)]
pub enum NpyError {
    /// Bad magic, unreadable header, or a short payload
    #[error("not a readable .npy payload: {0}")]
    Format(#[from] std::io::Error),

    #[error("unsupported dtype '{0}'")]
    UnsupportedDtype(String),

    #[error("shape {0:?} does not fit in memory")]
    ShapeOverflow(Vec<u64>),

    #[error("values do not match shape {0:?}")]
    Layout(Vec<usize>),
}

/// Decode a complete .npy stream into a named f32 Parameter.
pub fn decode<R: Read>(name: &str, reader: R) -> Result<Parameter, NpyError> {
    let npy = NpyFile::new(reader)?;

    let shape = npy
        .shape()
        .iter()
        .map(|&dim| usize::try_from(dim).ok())
        .collect::<Option<Vec<usize>>>()
        .ok_or_else(|| NpyError::ShapeOverflow(npy.shape().to_vec()))?;
    let order = npy.order();

    let values = read_as_f32(npy)?;
    let data = match order {
        Order::C => values,
        Order::Fortran => {
            let array = ArrayD::from_shape_vec(IxDyn(&shape).f(), values)
                .map_err(|_| NpyError::Layout(shape.clone()))?;
            array.iter().copied().collect()
        }
    };

    Ok(Parameter::new(name, shape, data))
}

/// Read every element in file order, cast to f32.
fn read_as_f32<R: Read>(npy: NpyFile<R>) -> Result<Vec<f32>, NpyError> {
    let dtype = npy.dtype();
    let DType::Plain(ty) = &dtype else {
        return Err(NpyError::UnsupportedDtype(format!("{dtype:?}")));
    };
    let unsupported = || NpyError::UnsupportedDtype(ty.to_string());

    let values = match (ty.type_char(), ty.size_field()) {
        (TypeChar::Float, 2) => cast(npy.into_vec::<f16>()?, f16::to_f32),
        (TypeChar::Float, 4) => npy.into_vec::<f32>()?,
        (TypeChar::Float, 8) => cast(npy.into_vec::<f64>()?, |v| v as f32),
        (TypeChar::Int, 1) => cast(npy.into_vec::<i8>()?, f32::from),
        (TypeChar::Int, 2) => cast(npy.into_vec::<i16>()?, f32::from),
        (TypeChar::Int, 4) => cast(npy.into_vec::<i32>()?, |v| v as f32),
        (TypeChar::Int, 8) => cast(npy.into_vec::<i64>()?, |v| v as f32),
        (TypeChar::Uint, 1) => cast(npy.into_vec::<u8>()?, f32::from),
        (TypeChar::Uint, 2) => cast(npy.into_vec::<u16>()?, f32::from),
        (TypeChar::Uint, 4) => cast(npy.into_vec::<u32>()?, |v| v as f32),
        (TypeChar::Uint, 8) => cast(npy.into_vec::<u64>()?, |v| v as f32),
        _ => return Err(unsupported()),
    };
    Ok(values)
}

fn cast<T>(values: Vec<T>, f: impl Fn(T) -> f32) -> Vec<f32> {
    values.into_iter().map(f).collect()
}

// ─── Test Support ─────────────────────────────────────────────────────────────
/// Builders for .npy buffers, shared by the tests of other modules.
#[cfg(test)]
pub(crate) mod test_support {
    /// Python's repr of a shape tuple: "()", "(64,)", "(3, 64)"
    fn shape_repr(shape: &[usize]) -> String {
        match shape {
            [] => "()".to_string(),
            [one] => format!("({one},)"),
            dims => format!(
                "({})",
                dims.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
            ),
        }
    }

    /// A version 1.0 .npy buffer with the given header fields and raw payload.
    pub(crate) fn npy_bytes(descr: &str, fortran: bool, shape: &[usize], payload: &[u8]) -> Vec<u8> {
        let fortran = if fortran { "True" } else { "False" };
        let mut header = format!(
            "{{'descr': '{descr}', 'fortran_order': {fortran}, 'shape': {}, }}",
            shape_repr(shape)
        );
        // numpy pads with spaces so the data starts 64-byte aligned, ending in '\n'
        let unpadded = 10 + header.len() + 1;
        header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
        header.push('\n');

        let mut out = Vec::new();
        out.extend_from_slice(b"\x93NUMPY\x01\x00");
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(payload);
        out
    }

    /// A little-endian f32 .npy buffer in row-major order.
    pub(crate) fn f32_npy(shape: &[usize], data: &[f32]) -> Vec<u8> {
        let payload: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        npy_bytes("<f4", false, shape, &payload)
    }
}
