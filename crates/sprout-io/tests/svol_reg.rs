//! Volume file regression test
//!
//! Writes synthetic volumes of several sample types to disk, reads them back
//! through the type-dispatching reader and checks shape, type and content.
//!
//! Run with:
//! ```
//! cargo test -p sprout-io --test svol_reg
//! ```

use sprout_core::{DType, Threshold, foreground_mask};
use sprout_io::{AnyVolume, DelimitedTable, read_any_file, read_header, write_volume_file};
use sprout_test::{RegParams, builders, scratch_dir};

#[test]
fn svol_reg() {
    let mut rp = RegParams::new("svol");
    let dir = scratch_dir("svol").unwrap();

    // Intensity volume
    let sphere = builders::sphere(17, 6.0).unwrap();
    let path = dir.join("sphere.svol");
    write_volume_file(&sphere, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    let header = read_header(&bytes).unwrap();
    rp.check(header.dtype == DType::U16, "stored as u16");
    rp.check(header.shape == sphere.shape(), "stored shape");
    eprintln!(
        "  sphere: {} bytes on disk for {} samples",
        bytes.len(),
        sphere.len()
    );
    rp.check(bytes.len() < sphere.len() * 2, "payload is compressed");

    match read_any_file(&path).unwrap() {
        AnyVolume::U16(back) => {
            rp.compare_volumes(&sphere, &back);
        }
        other => {
            rp.check(false, &format!("unexpected dtype {:?}", other.dtype()));
        }
    }

    // Mask and label volumes
    let mask = foreground_mask(&sphere, &Threshold::Single(1.0), None).unwrap();
    let path = dir.join("mask.svol");
    write_volume_file(&mask, &path).unwrap();
    let back = read_any_file(&path).unwrap();
    rp.check(back.dtype() == DType::Bool, "mask stored as bool");
    rp.compare_volumes(&mask, &back.to_mask());

    let labels = mask.map(|v| if v { 7u32 } else { 0 });
    let path = dir.join("labels.svol");
    write_volume_file(&labels, &path).unwrap();
    let back = read_any_file(&path).unwrap();
    rp.compare_values(mask.count() as f64, back.to_mask().count() as f64, 0.0);

    // 2D
    let disk = builders::disk(15, 5.0).unwrap();
    let path = dir.join("disk.svol");
    write_volume_file(&disk, &path).unwrap();
    let back = read_any_file(&path).unwrap();
    rp.compare_values(2.0, back.shape().ndim() as f64, 0.0);

    // History table
    let mut table = DelimitedTable::new(["key", "total_id", "split_id"]);
    table.push_row(["0", "1", "{}"]);
    table.push_row(["1", "2", r#"{"1":[2,3]}"#]);
    let path = dir.join("history.csv");
    table.write_file(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    rp.compare_values(3.0, text.lines().count() as f64, 0.0);
    rp.check(text.contains(r#""{""1"":[2,3]}""#), "comma field quoted");

    assert!(rp.cleanup());
}
