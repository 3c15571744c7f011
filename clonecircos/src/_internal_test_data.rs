use lazy_static::lazy_static;

use crate::table::RawTable;

/// Three rows of a single clone over two timepoints.
pub const THREE_ROW_CSV: &str = "Timepoint,Clone,Spec,Seq ID
S1-000,A,x,1
S1-000,A,x,2
S1-001,A,x,3
";

/// Twelve rows over three timepoints, with null clones, two `spec` values and
/// a clone that skips a timepoint.
pub const LINEAGE_CSV: &str = "Timepoint,Clone,Spec,Seq-ID,Isotype
S1-000,2,sp,s01,IgG
S1-000,3,dp,s02,IgG
S1-000,1,sp,s03,IgA
S1-000,,dp,s04,
S1-000,1,sp,s05,IgG
S1-007,1,sp,s06,IgG
S1-007,4,dp,s07,IgM
S1-007,4,dp,s08,IgM
S1-007,3,dp,s09,IgG
,,,,
S1-014,1,sp,s10,IgA
S1-014,2,sp,s11,IgG
S1-014,,sp,s12,
";

/// Expected karyotype of [`LINEAGE_CSV`], including the appended bands.
pub const LINEAGE_KARYOTYPE: &str = "#chr\t-\tID\tLABEL\tSTART\tEND\tCOLOR
chr\t-\tDay000\td0(5)\t0\t5\tchr1
chr\t-\tDay007\td7(4)\t0\t4\tchr2
chr\t-\tDay014\td14(3)\t0\t3\tchr3
#band\tcircos_time\tseq_id\tseq_id\tband_start\tband_stop\tband_color
band\tDay000\ts04\ts04\t0\t1\tgneg
band\tDay000\ts01\ts01\t1\t2\tgpos25
band\tDay000\ts02\ts02\t2\t3\tgneg
band\tDay000\ts03\ts03\t3\t4\tgpos25
band\tDay000\ts05\ts05\t4\t5\tgpos25
band\tDay007\ts06\ts06\t0\t1\tgpos25
band\tDay007\ts09\ts09\t1\t2\tgneg
band\tDay007\ts07\ts07\t2\t3\tgpos25
band\tDay007\ts08\ts08\t3\t4\tgpos25
band\tDay014\ts12\ts12\t0\t1\tgneg
band\tDay014\ts10\ts10\t1\t2\tgpos25
band\tDay014\ts11\ts11\t2\t3\tgneg
";

/// Expected links of [`LINEAGE_CSV`] for `spec_list = ["sp"]` and the `red`
/// hue range.
pub const LINEAGE_SP_LINKS: &str =
    "#circos_time\tband_start\tband_stop\tcircos_time_2\tband_start_2\tband_stop_2\tlink_color
Day000\t1\t2\tDay014\t2\t3\tcolor=hue020_a2
Day000\t3\t5\tDay007\t0\t1\tcolor=hue000_a2
Day007\t0\t1\tDay014\t1\t2\tcolor=hue000_a2
";

/// Expected links of [`LINEAGE_CSV`] for `spec_list = ["dp"]` and the `blue`
/// hue range.
pub const LINEAGE_DP_LINKS: &str =
    "#circos_time\tband_start\tband_stop\tcircos_time_2\tband_start_2\tband_stop_2\tlink_color
Day000\t2\t3\tDay007\t1\t2\tcolor=hue185_a2
";

lazy_static! {
    pub static ref THREE_ROW_TABLE: RawTable = read_table(THREE_ROW_CSV);
    pub static ref LINEAGE_TABLE: RawTable = read_table(LINEAGE_CSV);
}

fn read_table(csv: &str) -> RawTable {
    RawTable::from_csv_reader(csv.as_bytes()).expect("Invalid test table")
}

/// Builds a table with the required columns from `(timepoint, clone, spec,
/// seq_id)` tuples.
#[must_use]
pub fn table_from_rows(rows: &[(&str, Option<&str>, &str, &str)]) -> RawTable {
    let mut table = RawTable::new(["timepoint", "clone", "spec", "seq_id"]);
    for &(timepoint, clone, spec, seq_id) in rows {
        table.push_row([Some(timepoint), clone, Some(spec), Some(seq_id)]);
    }
    table
}
