use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Reason codes accepted by the transaction add/edit forms. The storage layer
/// itself does not constrain the field, so restored data may carry values
/// outside this set.
pub const REASONS: [&str; 5] = ["Alpha", "Haid", "Sakit", "Ijin", "Pulang sebelum waktunya"];

pub const EARLY_DEPARTURE_REASON: &str = "Pulang sebelum waktunya";

/// A student on the parental-call list has strictly more recorded
/// transactions than this.
pub const PARENT_CALL_THRESHOLD: usize = 2;

pub const EVERY_MONTH: &str = "Setiap Bulan";

pub const SCHEDULE_ACTIVITIES: [&str; 4] = [
    "Pembiasaan Sholat Dhuhur berjamaah",
    "Pembiasaan Baca Al-Quran (35 Menit)",
    "Pembiasaan Baca Tulis Al-Quran",
    "Peringatan Hari Besar Islam",
];

pub const SCHEDULE_DAYS: [&str; 6] = ["Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu"];

pub const SCHEDULE_WEEKS: [&str; 5] = [
    "Setiap Minggu",
    "Minggu ke-1",
    "Minggu ke-2",
    "Minggu ke-3",
    "Minggu ke-4",
];

pub const SCHEDULE_MONTHS: [&str; 13] = [
    "Setiap Bulan",
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: String,
    pub name: String,
    pub time: String,
}

/// One recorded instance of a student missing a religious activity. Student
/// name and class are captured at creation time and never re-synced, so the
/// record stays intact if the student is deleted later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub date: String,
    pub time: String,
    pub student_id: String,
    pub student_name: String,
    pub class: String,
    pub program: String,
    pub reason: String,
}

/// A planned recurring activity. `month` and `year` were added after the
/// first release; blobs written before then lack them and are filled in by
/// the store migration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub activity: String,
    pub day: String,
    pub week: String,
    #[serde(default)]
    pub month: String,
    #[serde(default)]
    pub year: String,
    pub class: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials {
            user: "admin".to_string(),
            pass: "admin123".to_string(),
        }
    }
}

/// The whole domain blob as persisted under the `sim_db` key. Blobs without
/// a `version` field predate schedule month/year and are treated as v1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    #[serde(default = "version_one")]
    pub version: u32,
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

fn version_one() -> u32 {
    1
}

impl Default for Database {
    fn default() -> Self {
        Database {
            version: crate::store::SCHEMA_VERSION,
            students: Vec::new(),
            programs: default_programs(),
            transactions: Vec::new(),
            schedules: Vec::new(),
        }
    }
}

pub fn default_programs() -> Vec<Program> {
    vec![
        Program {
            id: "1".to_string(),
            name: "Sholat Dhuha".to_string(),
            time: "07:00".to_string(),
        },
        Program {
            id: "2".to_string(),
            name: "Sholat Dzuhur".to_string(),
            time: "12:00".to_string(),
        },
        Program {
            id: "3".to_string(),
            name: "Jumat Beramal".to_string(),
            time: "Jumat 07:00".to_string(),
        },
    ]
}

static ID_SEQ: AtomicU64 = AtomicU64::new(0);

/// Mint an opaque record id from the current timestamp plus a per-process
/// counter so ids stay unique within a burst (bulk import mints many in the
/// same millisecond).
pub fn mint_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = ID_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", millis, seq)
}

pub fn is_valid_reason(reason: &str) -> bool {
    REASONS.contains(&reason)
}
