// Integration test for the adaptive pipeline
// (sign-magnitude split → offset refinement → both reconstructions → error metrics).
use aobq::{
    adaptive_quantize, compute_error_metrics, reconstruct_adaptive, reconstruct_offset,
    AdaptiveReport, Codec, ErrorKind, QuantizationMode, QuantizeError, UnifiedCodec,
};
use ndarray::{array, Array1, Array2};

/// Decades of magnitude: the smallest one decides the scaling factor.
#[test]
fn test_inferred_scaling_factor_for_decades() {
    let data = array![0.001f64, 0.01, 0.1];
    let record = adaptive_quantize(&data, None, None).unwrap();

    assert_eq!(record.scaling_factor(), 1000.0);
    assert_eq!(record.magnitude.decimal_part[0], 1);
    assert_eq!(record.magnitude.sign, array![1, 1, 1]);

    let recon = reconstruct_adaptive(&record);
    for (x, y) in data.iter().zip(recon.iter()) {
        assert!((x - y).abs() <= 0.5 / 1000.0 + 1e-12);
    }
}

/// Random-looking data in (-0.5, 0.5), the workload the adaptive quantizer targets.
#[test]
fn test_centered_grid_end_to_end() {
    let data = Array2::from_shape_fn((10, 10), |(i, j)| {
        let k = (i * 10 + j) as f64;
        ((k * 12.9898).sin() * 43758.5453).fract().abs() * 0.999 - 0.4995
    });

    let report = AdaptiveReport::build(&data, None, None).unwrap();
    let sf = report.scaling_factor();
    let offset = report.offset_report().expect("integer parts share one offset");
    println!("scaling factor {}, offset {}", sf, offset.refinement.offset);

    assert!(report.magnitude.integer_part.iter().all(|&i| i == 0));
    assert_eq!(offset.refinement.offset, 0);
    for (&x, &s) in data.iter().zip(report.magnitude.sign.iter()) {
        assert_eq!(s == 0, x == 0.0);
    }
    assert!(report.max_abs_error() <= 0.5 / sf + 1e-12);
    assert!(report.metrics.psnr > 0.0);
}

/// Offset refinement on a narrow band far from zero.
#[test]
fn test_narrow_band_far_from_zero() {
    let data: Array1<f64> = (0..200).map(|i| 180.0 + (i as f64 * 0.37).sin() * 40.0).collect();
    let record = adaptive_quantize(&data, Some(1e6), None).unwrap();

    let offset = record.offset();
    assert!((140..=220).contains(&offset), "offset {}", offset);
    assert!(record
        .refinement
        .integer_offset_part
        .iter()
        .all(|&i| (-128..=127).contains(&i)));

    let plain = reconstruct_adaptive(&record);
    let shifted = reconstruct_offset(&record);
    let m_plain = compute_error_metrics(&data, &plain).unwrap();
    let m_shifted = compute_error_metrics(&data, &shifted).unwrap();
    assert!(m_plain.mse < 1e-12);
    assert!((m_plain.mse - m_shifted.mse).abs() < 1e-15);
}

/// Magnitudes of 256 and above do not fit the 8-bit integer field.
#[test]
fn test_overflow_is_rejected() {
    let data = array![[12.0f64, 255.999], [-256.0, 3.0]];
    let err = adaptive_quantize(&data, None, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Range);
    assert!(matches!(err, QuantizeError::IntegerOverflow { index: 2, .. }));
    println!("rejected: {}", err);
}

/// An all-zero grid has no smallest magnitude to infer a scaling factor from.
#[test]
fn test_all_zero_is_a_domain_error() {
    let data = Array2::<f32>::zeros((4, 4));
    let err = adaptive_quantize(&data, None, None).unwrap_err();
    assert_eq!(err, QuantizeError::AllZero);
    assert_eq!(err.kind(), ErrorKind::Domain);

    // With an explicit factor the same grid encodes losslessly
    let record = adaptive_quantize(&data, Some(10.0), None).unwrap();
    assert!(reconstruct_offset(&record).iter().all(|&v| v == 0.0));
}

/// The same data through every mode of the unified codec, configured from JSON.
#[test]
fn test_all_modes_from_config() {
    let data = Array2::from_shape_fn((32, 32), |(i, j)| (i as f64 * 0.2).sin() * (j as f64 * 0.3).cos() * 50.0);
    let modes = [
        r#"{"mode":"uniform","bits":8}"#,
        r#"{"mode":"adaptive","scaling_factor":1000.0}"#,
        r#"{"mode":"offset"}"#,
    ];

    for json in modes {
        let mode: QuantizationMode = serde_json::from_str(json).unwrap();
        let codec = UnifiedCodec::new(mode);
        let rt = codec.round_trip(&data).unwrap();
        assert_eq!(rt.encoded.len(), data.len());
        assert_eq!(rt.reconstructed.shape(), data.shape());
        println!("{}: PSNR {:.2} dB", codec.mode_description(), rt.metrics.psnr);
        assert!(rt.metrics.psnr > 30.0, "{} too lossy", codec.name());
    }
}

/// Integer parts 0..=255 are too wide for one offset: the report keeps the adaptive half.
#[test]
fn test_report_without_offset_half() {
    let data = array![[1.5, -2.25], [0.0, 255.9]];
    assert_eq!(adaptive_quantize(&data, None, None).unwrap_err().kind(), ErrorKind::Range);

    let report = AdaptiveReport::build(&data, None, None).unwrap();
    assert!(report.offset_report().is_none());
    assert_eq!(report.offset.as_ref().unwrap_err().kind(), ErrorKind::Range);
    assert_eq!(report.reconstructed.shape(), data.shape());
    assert!(report.metrics.psnr > 0.0);
    assert!(report.max_abs_error() <= 0.5 / report.scaling_factor() + 1e-12);
}
