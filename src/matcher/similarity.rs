/// Cosine similarity between two equal-length vectors. The small epsilon
/// in the denominator keeps a zero vector at similarity 0 instead of NaN.
/// Callers are responsible for the equal-length precondition; the
/// semantic matcher rejects mismatched batches before ever getting here.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    debug_assert_eq!(a.len(), b.len());

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt() + 1e-9)
}
