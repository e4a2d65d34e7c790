//! Time-dependent target curvature.

use strand_markers::FilamentSpec;

/// Target bending angle at the triplet centred on `sequence_index`:
/// `l0 · A(t) · sin(ω t + phase(sequence_index))`.
pub fn target_angle(spec: &FilamentSpec, time: f64, sequence_index: u32) -> f64 {
    let a = &spec.actuation;
    if a.is_inactive() {
        return 0.0;
    }
    let l0 = spec.rest_length();
    let phase = a.phase(sequence_index, l0, spec.length);
    l0 * a.amplitude_at(time) * (a.angular_frequency * time + phase).sin()
}
