//! Swiss pairings results and standings.

use csv::StringRecord;
use serde::Serialize;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PairingsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Pairings file is missing the '{0}' column")]
    MissingColumn(String),
    #[error("Line {line}: invalid round '{value}'")]
    InvalidRound { line: u64, value: String },
    #[error("Line {line}: invalid result '{value}'")]
    InvalidResult { line: u64, value: String },
    #[error("Line {line}: only byes may have no opponent")]
    MissingOpponent { line: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
    Bye,
}

impl Outcome {
    pub fn points(&self) -> u32 {
        match self {
            Outcome::Win | Outcome::Bye => 3,
            Outcome::Tie => 1,
            Outcome::Loss => 0,
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "w" | "win" => Ok(Outcome::Win),
            "l" | "loss" => Ok(Outcome::Loss),
            "t" | "tie" => Ok(Outcome::Tie),
            "b" | "bye" => Ok(Outcome::Bye),
            other => Err(other.to_string()),
        }
    }
}

/// One player's result in one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub round: u32,
    pub player_name: String,
    pub opponent_name: Option<String>,
    pub outcome: Outcome,
}

/// `Jane  Doe` -> `Jane_Doe`, matching decklist file names
pub fn normalize_player_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}

fn column(headers: &StringRecord, name: &str) -> Result<usize, PairingsError> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| PairingsError::MissingColumn(name.to_string()))
}

pub fn parse_pairings<R: Read>(reader: R) -> Result<Vec<Pairing>, PairingsError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers()?.clone();
    let round_col = column(&headers, "round")?;
    let player_col = column(&headers, "player")?;
    let opponent_col = column(&headers, "opponent")?;
    let result_col = column(&headers, "result")?;

    let mut pairings = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        let round = field(round_col)
            .parse()
            .map_err(|_| PairingsError::InvalidRound {
                line,
                value: field(round_col).to_string(),
            })?;
        let outcome: Outcome = field(result_col)
            .parse()
            .map_err(|value| PairingsError::InvalidResult { line, value })?;

        let opponent = field(opponent_col);
        let opponent_name = if opponent.is_empty() {
            if outcome != Outcome::Bye {
                return Err(PairingsError::MissingOpponent { line });
            }
            None
        } else {
            Some(normalize_player_name(opponent))
        };

        pairings.push(Pairing {
            round,
            player_name: normalize_player_name(field(player_col)),
            opponent_name,
            outcome,
        });
    }

    log::debug!("Parsed {} pairings", pairings.len());
    Ok(pairings)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub player_name: String,
    pub points: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub byes: u32,
}

/// Points per player, highest first, ties broken by name
pub fn standings(pairings: &[Pairing]) -> Vec<Standing> {
    let mut by_player: HashMap<&str, Standing> = HashMap::new();
    for pairing in pairings {
        let standing = by_player
            .entry(pairing.player_name.as_str())
            .or_insert_with(|| Standing {
                player_name: pairing.player_name.clone(),
                ..Default::default()
            });
        standing.points += pairing.outcome.points();
        match pairing.outcome {
            Outcome::Win => standing.wins += 1,
            Outcome::Loss => standing.losses += 1,
            Outcome::Tie => standing.ties += 1,
            Outcome::Bye => standing.byes += 1,
        }
    }

    let mut table: Vec<Standing> = by_player.into_values().collect();
    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.player_name.cmp(&b.player_name))
    });
    table
}

#[derive(Serialize)]
struct PairingRow<'a> {
    round: u32,
    player_name: &'a str,
    opponent_name: Option<&'a str>,
    outcome: Outcome,
    points: u32,
}

pub fn write_pairings_table<W: Write>(writer: W, pairings: &[Pairing]) -> Result<(), PairingsError> {
    let mut csv = csv::Writer::from_writer(writer);
    for p in pairings {
        csv.serialize(PairingRow {
            round: p.round,
            player_name: &p.player_name,
            opponent_name: p.opponent_name.as_deref(),
            outcome: p.outcome,
            points: p.outcome.points(),
        })?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<Pairing> {
        let file = std::fs::File::open("fixtures/pairings.csv").expect("fixture");
        parse_pairings(file).expect("pairings should parse")
    }

    #[test]
    fn test_parse_pairings() {
        let pairings = fixture();
        assert_eq!(pairings.len(), 6);
        assert_eq!(
            pairings[0],
            Pairing {
                round: 1,
                player_name: "Jane_Doe".to_string(),
                opponent_name: Some("John_Smith".to_string()),
                outcome: Outcome::Win,
            }
        );
        assert_eq!(pairings[2].opponent_name, None);
        assert_eq!(pairings[5].outcome, Outcome::Bye);
    }

    #[test]
    fn test_standings() {
        let table = standings(&fixture());
        let summary: Vec<(&str, u32)> = table.iter().map(|s| (s.player_name.as_str(), s.points)).collect();
        assert_eq!(summary, vec![("Ann_Lee", 4), ("Jane_Doe", 4), ("John_Smith", 3)]);
        assert_eq!(table[0].byes, 1);
        assert_eq!(table[0].ties, 1);
    }

    #[test]
    fn test_case_insensitive_headers() {
        let csv = "ROUND,player,Opponent,RESULT\n1,Ann Lee,Jane Doe,win\n";
        let pairings = parse_pairings(csv.as_bytes()).expect("pairings should parse");
        assert_eq!(pairings[0].outcome, Outcome::Win);
        assert_eq!(pairings[0].player_name, "Ann_Lee");
    }

    #[test]
    fn test_parse_errors() {
        let missing = "Round,Player,Result\n1,Ann Lee,W\n";
        assert!(matches!(
            parse_pairings(missing.as_bytes()),
            Err(PairingsError::MissingColumn(c)) if c == "opponent"
        ));

        let bad_result = "Round,Player,Opponent,Result\n1,Ann Lee,Jane Doe,X\n";
        assert!(matches!(
            parse_pairings(bad_result.as_bytes()),
            Err(PairingsError::InvalidResult { line: 2, .. })
        ));

        let bad_round = "Round,Player,Opponent,Result\none,Ann Lee,Jane Doe,W\n";
        assert!(matches!(
            parse_pairings(bad_round.as_bytes()),
            Err(PairingsError::InvalidRound { .. })
        ));

        let no_opponent = "Round,Player,Opponent,Result\n1,Ann Lee,,W\n";
        assert!(matches!(
            parse_pairings(no_opponent.as_bytes()),
            Err(PairingsError::MissingOpponent { line: 2 })
        ));
    }

    #[test]
    fn test_write_pairings_table() {
        let mut out = Vec::new();
        write_pairings_table(&mut out, &fixture()).expect("csv should write");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "round,player_name,opponent_name,outcome,points");
        assert_eq!(lines[1], "1,Jane_Doe,John_Smith,win,3");
        assert_eq!(lines[3], "1,Ann_Lee,,bye,3");
    }
}
