//! Roster data: player records and the CSV loader that produces them.
//!
//! # Data Structure
//!
//! ```text
//! RosterTable                 (raw CSV, as read)
//! ├─ columns: BTreeSet<Column>   which known columns the header carries
//! └─ rows: Vec<RawPlayerRow>     every known field optional
//!        │
//!        │ RosterTable::to_roster()   checks required columns/values
//!        ▼
//! Roster
//! └─ players: Vec<PlayerRecord>  unique names, numeric counts
//! ```
//!
//! # Input Columns
//!
//! | Column        | Accepted headers                     | Required            |
//! |---------------|--------------------------------------|---------------------|
//! | `Player`      | `Player`, `PlayerName`, `player`     | column and values   |
//! | `Goals`       | `Goals`, `goal`                      | column and values   |
//! | `Games`       | `Games`, `Games_Played`, `GP`        | column only         |
//! | `Assists`     | `Assists`, `assists`                 | no                  |
//! | `Points`      | `Points`, `points`                   | no                  |
//! | `Shots`       | `Shots`, `shots`                     | no                  |
//! | `Possessions` | `Possessions`, `possessions`         | no                  |
//!
//! If several headers name the same column, the canonical (first listed)
//! header is read. Without it, the leftmost alias is read. The others are
//! ignored.
//!
//! A blank `Games` value is kept as missing and yields an undefined rate
//! downstream. A blank `Assists` value is derived as `Points - Goals` when
//! points are given, and 0 otherwise.
//!
//! # Examples
//!
//! ```
//! use ppg_analysis::roster::RosterTable;
//!
//! let csv = "PlayerName,Goals,Assists,GP\nA,10,5,5\nB,6,2,4\n";
//! let roster = RosterTable::from_reader(csv.as_bytes())?.to_roster()?;
//!
//! assert_eq!(roster.len(), 2);
//! assert_eq!(roster.get("A").unwrap().points(), 15.0);
//! # Ok::<(), ppg_analysis::roster::RosterError>(())
//! ```

use std::{
    collections::{BTreeSet, HashSet},
    io,
};

use serde::{Deserialize, Serialize};

/// A known input column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Column {
    Player,
    Goals,
    Assists,
    Games,
    Points,
    Shots,
    Possessions,
}

impl Column {
    pub const ALL: [Self; 7] = [
        Self::Player,
        Self::Goals,
        Self::Assists,
        Self::Games,
        Self::Points,
        Self::Shots,
        Self::Possessions,
    ];

    /// Header names accepted for this column, canonical name first.
    #[must_use]
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Player => &["Player", "PlayerName", "player"],
            Self::Goals => &["Goals", "goal"],
            Self::Assists => &["Assists", "assists"],
            Self::Games => &["Games", "Games_Played", "GP"],
            Self::Points => &["Points", "points"],
            Self::Shots => &["Shots", "shots"],
            Self::Possessions => &["Possessions", "possessions"],
        }
    }

    /// The header this column is written under.
    #[must_use]
    pub fn canonical(self) -> &'static str {
        self.headers()[0]
    }

    fn from_header(header: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.headers().contains(&header))
    }
}

/// A numeric player field that analyses can select by name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    #[display("goals")]
    Goals,
    #[display("assists")]
    Assists,
    #[display("points")]
    Points,
    #[display("games")]
    Games,
    #[display("shots")]
    Shots,
    #[display("possessions")]
    Possessions,
}

impl Field {
    /// Whether every [`PlayerRecord`] is guaranteed to carry this field.
    #[must_use]
    pub fn is_mandatory(self) -> bool {
        matches!(self, Self::Goals | Self::Assists | Self::Points)
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum RosterError {
    #[display("missing required column '{column}' (accepted headers: {})", column.headers().join(", "))]
    MissingColumn { column: Column },
    #[display("row {row}: missing value for required column '{column}'")]
    MissingValue { row: usize, column: Column },
    #[display("row {row}: invalid number in column '{column}'")]
    InvalidNumber { row: usize, column: Column },
    #[display("duplicate player '{name}'")]
    DuplicatePlayer { name: String },
    #[display("failed to read roster CSV")]
    Csv { source: csv::Error },
}

/// One CSV row with every known field optional.
///
/// Fields are read under their canonical header; [`RosterTable::from_reader`]
/// rewrites aliased headers before deserializing. Unknown columns are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawPlayerRow {
    #[serde(rename = "Player")]
    pub player: Option<String>,
    #[serde(rename = "Goals")]
    pub goals: Option<f64>,
    #[serde(rename = "Assists")]
    pub assists: Option<f64>,
    #[serde(rename = "Games")]
    pub games: Option<f64>,
    #[serde(rename = "Points")]
    pub points: Option<f64>,
    #[serde(rename = "Shots")]
    pub shots: Option<f64>,
    #[serde(rename = "Possessions")]
    pub possessions: Option<f64>,
}

impl RawPlayerRow {
    /// Returns `true` if this row has no value for `column`.
    #[must_use]
    pub fn is_missing(&self, column: Column) -> bool {
        match column {
            Column::Player => self.player.as_deref().is_none_or(str::is_empty),
            Column::Goals => self.goals.is_none(),
            Column::Assists => self.assists.is_none(),
            Column::Games => self.games.is_none(),
            Column::Points => self.points.is_none(),
            Column::Shots => self.shots.is_none(),
            Column::Possessions => self.possessions.is_none(),
        }
    }
}

/// Maps each header to the column it supplies.
///
/// A canonical header wins over its aliases, and otherwise the first alias
/// wins. Headers that supply no column map to `None`.
fn resolve_headers(headers: &csv::StringRecord) -> Vec<Option<Column>> {
    let mut resolved = vec![None; headers.len()];
    let mut claimed = BTreeSet::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(column) = Column::ALL.into_iter().find(|c| c.canonical() == header)
            && claimed.insert(column)
        {
            resolved[i] = Some(column);
        }
    }
    for (i, header) in headers.iter().enumerate() {
        if resolved[i].is_none()
            && let Some(column) = Column::from_header(header)
            && claimed.insert(column)
        {
            resolved[i] = Some(column);
        }
    }
    resolved
}

/// Attributes a field-level parse failure to its row and column.
fn read_error(resolved: &[Option<Column>], row: usize, source: csv::Error) -> RosterError {
    if let csv::ErrorKind::Deserialize { err, .. } = source.kind()
        && let Some(column) = err
            .field()
            .and_then(|field| usize::try_from(field).ok())
            .and_then(|field| resolved.get(field).copied().flatten())
    {
        return RosterError::InvalidNumber { row, column };
    }
    RosterError::Csv { source }
}

/// Raw roster as read from CSV, before validation.
#[derive(Debug, Clone, Default)]
pub struct RosterTable {
    /// Known columns present in the header.
    pub columns: BTreeSet<Column>,
    /// Data rows in file order.
    pub rows: Vec<RawPlayerRow>,
}

impl RosterTable {
    /// Reads a roster CSV with a header row.
    ///
    /// Whitespace around fields is trimmed and blank numeric fields are read
    /// as missing. A non-numeric value in a numeric column is an error.
    /// When a header carries both a canonical name and an alias for the same
    /// column, the canonical one is read and the alias ignored.
    pub fn from_reader<R>(reader: R) -> Result<Self, RosterError>
    where
        R: io::Read,
    {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let resolved = resolve_headers(
            reader
                .headers()
                .map_err(|source| RosterError::Csv { source })?,
        );
        reader.set_headers(
            resolved
                .iter()
                .map(|column| column.map_or("", Column::canonical))
                .collect(),
        );

        let columns = resolved.iter().flatten().copied().collect();
        let rows = reader
            .deserialize::<RawPlayerRow>()
            .enumerate()
            .map(|(i, row)| row.map_err(|source| read_error(&resolved, i + 1, source)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { columns, rows })
    }

    /// Validates the table and builds a [`Roster`].
    ///
    /// # Errors
    ///
    /// Fails if the `Player`, `Goals` or `Games` column is absent, if a row
    /// lacks a player name or goal count, or if a player name repeats.
    pub fn to_roster(&self) -> Result<Roster, RosterError> {
        for column in [Column::Player, Column::Goals, Column::Games] {
            if !self.columns.contains(&column) {
                return Err(RosterError::MissingColumn { column });
            }
        }

        let players = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let row_number = i + 1;
                let missing = |column| RosterError::MissingValue {
                    row: row_number,
                    column,
                };
                let name = row
                    .player
                    .clone()
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| missing(Column::Player))?;
                let goals = row.goals.ok_or_else(|| missing(Column::Goals))?;
                let assists = row
                    .assists
                    .or_else(|| row.points.map(|points| points - goals))
                    .unwrap_or(0.0);
                Ok(PlayerRecord {
                    name,
                    goals,
                    assists,
                    games: row.games,
                    shots: row.shots,
                    possessions: row.possessions,
                })
            })
            .collect::<Result<Vec<_>, RosterError>>()?;

        Roster::new(players)
    }
}

/// A single player's season counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player name, unique within a roster.
    pub name: String,
    pub goals: f64,
    pub assists: f64,
    /// Games played; `None` when unknown.
    pub games: Option<f64>,
    /// Shots taken; `None` when unknown.
    pub shots: Option<f64>,
    /// Possessions; `None` when unknown.
    pub possessions: Option<f64>,
}

impl PlayerRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, goals: f64, assists: f64, games: Option<f64>) -> Self {
        Self {
            name: name.into(),
            goals,
            assists,
            games,
            shots: None,
            possessions: None,
        }
    }

    #[must_use]
    pub fn with_shots(mut self, shots: f64) -> Self {
        self.shots = Some(shots);
        self
    }

    #[must_use]
    pub fn with_possessions(mut self, possessions: f64) -> Self {
        self.possessions = Some(possessions);
        self
    }

    /// Goals plus assists.
    #[must_use]
    pub fn points(&self) -> f64 {
        self.goals + self.assists
    }

    #[must_use]
    pub fn value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Goals => Some(self.goals),
            Field::Assists => Some(self.assists),
            Field::Points => Some(self.points()),
            Field::Games => self.games,
            Field::Shots => self.shots,
            Field::Possessions => self.possessions,
        }
    }
}

/// An immutable set of players with unique names.
///
/// Order is preserved and used only to break ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    players: Vec<PlayerRecord>,
}

impl Roster {
    /// Creates a roster, rejecting duplicate names.
    pub fn new(players: Vec<PlayerRecord>) -> Result<Self, RosterError> {
        let mut seen = HashSet::with_capacity(players.len());
        for player in &players {
            if !seen.insert(player.name.as_str()) {
                return Err(RosterError::DuplicatePlayer {
                    name: player.name.clone(),
                });
            }
        }
        Ok(Self { players })
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Whether the field is available for this roster.
    ///
    /// Mandatory fields are always available; optional fields are available
    /// when at least one player carries a value.
    #[must_use]
    pub fn has_field(&self, field: Field) -> bool {
        field.is_mandatory() || self.players.iter().any(|p| p.value(field).is_some())
    }

    /// Returns a new roster without the named players.
    #[must_use]
    pub fn without(&self, names: &HashSet<&str>) -> Self {
        let players = self
            .players
            .iter()
            .filter(|p| !names.contains(p.name.as_str()))
            .cloned()
            .collect();
        Self { players }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(csv: &str) -> Result<Roster, RosterError> {
        RosterTable::from_reader(csv.as_bytes())?.to_roster()
    }

    #[test]
    fn reads_canonical_headers() {
        let roster = load(
            "Player,Goals,Assists,Games,Shots,Possessions\n\
             A,10,5,5,30,50\n\
             B,6,2,4,,\n",
        )
        .unwrap();
        let a = roster.get("A").unwrap();
        assert_eq!(a.points(), 15.0);
        assert_eq!(a.games, Some(5.0));
        assert_eq!(a.shots, Some(30.0));
        assert_eq!(a.possessions, Some(50.0));
        let b = roster.get("B").unwrap();
        assert_eq!(b.shots, None);
        assert!(roster.has_field(Field::Shots));
    }

    #[test]
    fn accepts_aliases_and_ignores_unknown_columns() {
        let table =
            RosterTable::from_reader("player,goal,assists,Games_Played,Team\nA,3,1,2,X\n".as_bytes())
                .unwrap();
        assert!(table.columns.contains(&Column::Player));
        assert!(table.columns.contains(&Column::Games));
        assert!(!table.columns.contains(&Column::Shots));
        let roster = table.to_roster().unwrap();
        assert_eq!(roster.players()[0].points(), 4.0);
        assert!(!roster.has_field(Field::Shots));
    }

    #[test]
    fn derives_assists_from_points() {
        let roster = load("Player,Goals,Points,GP\nA,4,9,3\nB,2,,3\n").unwrap();
        assert_eq!(roster.get("A").unwrap().assists, 5.0);
        assert_eq!(roster.get("B").unwrap().assists, 0.0);
    }

    #[test]
    fn blank_games_value_is_kept_as_missing() {
        let roster = load("Player,Goals,Assists,Games\nA,4,1,\n").unwrap();
        assert_eq!(roster.get("A").unwrap().games, None);
    }

    #[test]
    fn missing_games_column_is_fatal() {
        let err = load("Player,Goals,Assists\nA,1,1\n").unwrap_err();
        assert!(matches!(
            err,
            RosterError::MissingColumn {
                column: Column::Games
            }
        ));
        assert!(err.to_string().contains("Games_Played"));
    }

    #[test]
    fn missing_required_value_is_fatal() {
        let err = load("Player,Goals,Games\nA,1,1\n,2,2\n").unwrap_err();
        assert!(matches!(
            err,
            RosterError::MissingValue {
                row: 2,
                column: Column::Player
            }
        ));
        let err = load("Player,Goals,Games\nA,,1\n").unwrap_err();
        assert!(matches!(
            err,
            RosterError::MissingValue {
                row: 1,
                column: Column::Goals
            }
        ));
    }

    #[test]
    fn non_numeric_count_is_fatal() {
        let err = load("Player,Goals,Games\nA,1,1\nB,many,1\n").unwrap_err();
        assert!(matches!(
            err,
            RosterError::InvalidNumber {
                row: 2,
                column: Column::Goals
            }
        ));
        assert_eq!(err.to_string(), "row 2: invalid number in column 'Goals'");
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let err = load("Player,Goals,Games\nA,1,1\nA,2,2\n").unwrap_err();
        assert!(matches!(err, RosterError::DuplicatePlayer { name } if name == "A"));
    }

    #[test]
    fn without_returns_new_roster() {
        let roster = Roster::new(vec![
            PlayerRecord::new("A", 1.0, 0.0, Some(1.0)),
            PlayerRecord::new("B", 2.0, 0.0, Some(1.0)),
        ])
        .unwrap();
        let rest = roster.without(&HashSet::from(["A"]));
        assert_eq!(rest.len(), 1);
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn field_names_parse_case_insensitively() {
        assert_eq!("shots".parse::<Field>().unwrap(), Field::Shots);
        assert_eq!("Possessions".parse::<Field>().unwrap(), Field::Possessions);
        assert_eq!(Field::Goals.to_string(), "goals");
    }

    #[test]
    fn canonical_header_wins_over_alias() {
        let roster = load("Player,Goals,Assists,Games,GP\nA,10,5,5,7\nB,6,2,4,9\n").unwrap();
        assert_eq!(roster.get("A").unwrap().games, Some(5.0));
        assert_eq!(roster.get("B").unwrap().games, Some(4.0));

        let roster = load("Player,goal,Goals,Games\nA,1,2,1\n").unwrap();
        assert_eq!(roster.get("A").unwrap().goals, 2.0);
    }

    #[test]
    fn first_alias_wins_without_canonical_header() {
        let table =
            RosterTable::from_reader("GP,PlayerName,Games_Played,goal\n4,A,9,8\n".as_bytes())
                .unwrap();
        assert_eq!(
            table.columns,
            BTreeSet::from([Column::Player, Column::Goals, Column::Games])
        );
        let roster = table.to_roster().unwrap();
        assert_eq!(roster.get("A").unwrap().games, Some(4.0));
        assert_eq!(roster.get("A").unwrap().goals, 8.0);
    }
}
