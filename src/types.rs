/// Type alias for the confidence of a rule or a (partial) proof.
///
/// Higher is more certain. A proof is discharged exactly when its confidence reaches
/// [`DISCHARGED_MAX`].
pub type Confidence = i16;

/// Confidence of an open node or of a branch containing one
pub const PENDING: Confidence = 0;

/// Upper bound for confidences of reviewed (not formally proved) rules
pub const REVIEWED_MAX: Confidence = 500;

/// Confidence of a fully discharged proof
pub const DISCHARGED_MAX: Confidence = 1000;

/// Tests whether `confidence` counts as discharged
pub fn is_discharged(confidence: Confidence) -> bool {
    confidence >= DISCHARGED_MAX
}

/// Tests whether `confidence` counts as reviewed (but not discharged)
pub fn is_reviewed(confidence: Confidence) -> bool {
    confidence > PENDING && confidence <= REVIEWED_MAX
}
