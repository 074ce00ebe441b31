//! Sleep log entries
//!
//! The sleep screen keeps a [`RemoteResource`](crate::api::RemoteResource) of
//! [`SleepEntry`] records at `/api/sleep`, an entry form, and two views of the
//! mirror: today's entries by time, and earlier entries newest first.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::api::Record;
use crate::filter::Filterable;
use crate::forms::{validator, FieldSpec, FormState, FormValues, ValidationKind, ValidationResult};
use crate::types::{AppError, Result};

/// Collection path on the backend
pub const SLEEP_PATH: &str = "/api/sleep";

/// Baby name attached to new entries until profiles exist
pub const DEFAULT_BABY_NAME: &str = "YourBaby";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepType {
    #[default]
    Nap,
    Night,
}

impl SleepType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SleepType::Nap => "nap",
            SleepType::Night => "night",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            SleepType::Nap => "sleep.nap",
            SleepType::Night => "sleep.night",
        }
    }
}

impl fmt::Display for SleepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SleepType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "nap" => Ok(SleepType::Nap),
            "night" => Ok(SleepType::Night),
            other => Err(AppError::InvalidInput(format!("Unknown sleep type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sleepy,
    Cranky,
    Playful,
}

impl Mood {
    pub const ALL: [Mood; 4] = [Mood::Happy, Mood::Sleepy, Mood::Cranky, Mood::Playful];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sleepy => "sleepy",
            Mood::Cranky => "cranky",
            Mood::Playful => "playful",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Sleepy => "😴",
            Mood::Cranky => "😠",
            Mood::Playful => "😄",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Mood::Happy => "sleep.moodAfterSleepHappy",
            Mood::Sleepy => "sleep.moodAfterSleepSleepy",
            Mood::Cranky => "sleep.moodAfterSleepCranky",
            Mood::Playful => "sleep.moodAfterSleepPlayful",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown mood '{}'", s)))
    }
}

/// `""` or a missing mood on the wire means no mood was picked. A mood this
/// client does not know is shown as none rather than failing the whole list.
fn mood_or_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Option<Mood>, D::Error> {
    let raw: Option<String> = Option::deserialize(d)?;
    Ok(match raw.as_deref() {
        None | Some("") => None,
        Some(s) => match s.parse::<Mood>() {
            Ok(mood) => Some(mood),
            Err(_) => {
                warn!(mood = s, "Unknown mood on sleep entry; showing none");
                None
            }
        },
    })
}

fn mood_as_str<S: Serializer>(mood: &Option<Mood>, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(mood.map(|m| m.as_str()).unwrap_or(""))
}

fn default_baby_name() -> String {
    DEFAULT_BABY_NAME.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepEntry {
    #[serde(rename = "_id")]
    pub id: String,
    /// `YYYY-MM-DD`, sometimes a full ISO timestamp
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[serde(rename = "type")]
    pub kind: SleepType,
    #[serde(default)]
    pub duration: String,
    #[serde(default, deserialize_with = "mood_or_empty", serialize_with = "mood_as_str")]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub notes: String,
    #[serde(default = "default_baby_name")]
    pub baby_name: String,
}

impl SleepEntry {
    /// Calendar day part of `date`
    pub fn day(&self) -> &str {
        self.date.split('T').next().unwrap_or(&self.date)
    }

    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.day() == day.format(DATE_FORMAT).to_string()
    }
}

impl Filterable for SleepEntry {
    fn description(&self) -> Option<&str> {
        Some(&self.notes).filter(|n| !n.is_empty()).map(String::as_str)
    }

    fn category(&self) -> Option<&str> {
        self.mood.as_ref().map(Mood::as_str)
    }

    fn kind(&self) -> Option<&str> {
        Some(self.kind.as_str())
    }
}

/// Body of `POST /api/sleep`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSleepEntry {
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: SleepType,
    pub duration: String,
    #[serde(serialize_with = "mood_as_str")]
    pub mood: Option<Mood>,
    pub notes: String,
    pub baby_name: String,
}

impl NewSleepEntry {
    /// Build from submitted [`sleep_form`] values, dated `day`.
    pub fn from_values(values: &FormValues, day: NaiveDate) -> Result<Self> {
        let fields = EntryFields::parse(values)?;
        Ok(Self {
            date: day.format(DATE_FORMAT).to_string(),
            time: fields.time,
            kind: fields.kind,
            duration: fields.duration,
            mood: fields.mood,
            notes: fields.notes,
            baby_name: default_baby_name(),
        })
    }
}

/// Body of `PATCH /api/sleep/:id`; absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SleepType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// `Some(None)` clears the mood
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<MoodChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Mood value inside a patch; serializes like the entry field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodChange(pub Option<Mood>);

impl Serialize for MoodChange {
    fn serialize<S: Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        mood_as_str(&self.0, s)
    }
}

impl SleepPatch {
    /// Patch carrying every field of a submitted edit form
    pub fn from_values(values: &FormValues) -> Result<Self> {
        let fields = EntryFields::parse(values)?;
        Ok(Self {
            time: Some(fields.time),
            kind: Some(fields.kind),
            duration: Some(fields.duration),
            mood: Some(MoodChange(fields.mood)),
            notes: Some(fields.notes),
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

struct EntryFields {
    time: String,
    kind: SleepType,
    duration: String,
    mood: Option<Mood>,
    notes: String,
}

impl EntryFields {
    fn parse(values: &FormValues) -> Result<Self> {
        let get = |name: &str| values.get(name).map(|v| v.trim().to_string()).unwrap_or_default();

        let kind = match get("type").as_str() {
            "" => SleepType::default(),
            other => other.parse()?,
        };
        let mood = match get("mood").as_str() {
            "" => None,
            other => Some(other.parse()?),
        };

        Ok(Self {
            time: get("time"),
            kind,
            duration: get("duration"),
            mood,
            notes: get("notes"),
        })
    }
}

impl Record for SleepEntry {
    type Id = String;
    type Draft = NewSleepEntry;
    type Patch = SleepPatch;

    fn id(&self) -> &String {
        &self.id
    }
}

fn one_of(allowed: &'static [&'static str]) -> impl Fn(&str) -> ValidationResult + Send + Sync {
    move |value: &str| {
        if allowed.contains(&value.trim()) {
            ValidationResult::ok()
        } else {
            ValidationResult::fail(
                ValidationKind::Malformed,
                format!("Expected one of: {}", allowed.join(", ")),
            )
        }
    }
}

/// Entry form: time and duration are required, mood and notes optional.
pub fn sleep_form() -> FormState {
    FormState::new(vec![
        FieldSpec::new("time", validator::required()),
        FieldSpec::new("type", one_of(&["nap", "night"])),
        FieldSpec::new("duration", validator::required()),
        FieldSpec::new("mood", one_of(&["happy", "sleepy", "cranky", "playful"])).optional(),
        FieldSpec::new("notes", validator::required()).optional(),
    ])
    .with_values([("type", "nap")])
}

/// Entry form prefilled from an existing entry
pub fn edit_form(entry: &SleepEntry) -> FormState {
    sleep_form().with_values([
        ("time", entry.time.clone()),
        ("type", entry.kind.as_str().to_string()),
        ("duration", entry.duration.clone()),
        ("mood", entry.mood.map(|m| m.as_str().to_string()).unwrap_or_default()),
        ("notes", entry.notes.clone()),
    ])
}

/// The calendar day new entries are stamped with. Dates are UTC so a
/// terminal and the web app agree on which entries belong to today.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Entries dated `today`, earliest time first
pub fn todays_entries(entries: &[SleepEntry], today: NaiveDate) -> Vec<&SleepEntry> {
    let mut list: Vec<&SleepEntry> = entries.iter().filter(|e| e.is_on(today)).collect();
    list.sort_by(|a, b| a.time.cmp(&b.time));
    list
}

/// Entries not dated `today`, most recent day first
pub fn previous_entries(entries: &[SleepEntry], today: NaiveDate) -> Vec<&SleepEntry> {
    let mut list: Vec<&SleepEntry> = entries.iter().filter(|e| !e.is_on(today)).collect();
    list.sort_by(|a, b| b.day().cmp(a.day()));
    list
}
