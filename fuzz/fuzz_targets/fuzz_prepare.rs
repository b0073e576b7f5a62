#![no_main]

use codelens::histogram::dump::RECORD_SIZE;
use codelens::{prepare, prepare_into, rle, Histogram, PackedLayout, MAX_CODE_LENGTHS};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Treat the input as a raw histogram record, padding short inputs with zeros
    let mut record = [0u8; RECORD_SIZE];
    let len = data.len().min(RECORD_SIZE);
    record[..len].copy_from_slice(&data[..len]);

    let layout = PackedLayout::default();
    let histogram = match Histogram::from_le_bytes(&record, layout) {
        Ok(h) => h,
        Err(_) => return,
    };

    let lengths = prepare(&histogram);
    let counts = lengths.counts();

    // Output covers exactly the used prefixes
    assert_eq!(lengths.len(), counts.total());
    assert!(counts.distances >= 1);
    assert!(histogram.literals[counts.literals as usize..].iter().all(|e| !e.is_used()));

    if histogram.distances.iter().all(|e| !e.is_used()) {
        assert_eq!(lengths.distance_lengths(), &[1]);
    } else {
        assert!(histogram.distances[counts.distances as usize..].iter().all(|e| !e.is_used()));
        assert!(histogram.distances[counts.distances as usize - 1].is_used());
    }

    // Caller-buffer variant agrees with the owned one
    let mut out = [0u8; MAX_CODE_LENGTHS];
    let into_counts = prepare_into(&histogram, &mut out).expect("worst-case buffer always fits");
    assert_eq!(into_counts, counts);
    assert_eq!(&out[..counts.total()], lengths.as_slice());

    // The run-length coded form expands back to the same sequence; longer lengths are refused
    if histogram.validate().is_ok() {
        let tokens = rle::encode(lengths.as_slice()).expect("validated lengths are encodable");
        let expanded = rle::expand(&tokens).expect("encoder output is well formed");
        assert_eq!(expanded, lengths.as_slice());
    } else if lengths.as_slice().iter().any(|&l| l > 15) {
        assert!(rle::encode(lengths.as_slice()).is_err());
    }
});
