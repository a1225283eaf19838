// SPDX-License-Identifier: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::backgammon::BgMove;
use crate::collection::Collection;
use crate::value::CookedValue;
use crate::CheckerColor;

/// Match reader facade
pub struct MatchReader;

impl MatchReader {
    pub fn parse_file(path: &Path) -> Result<ParsedMatch> {
        parse_match_file(path)
    }

    pub fn parse_string(content: &str) -> Result<ParsedMatch> {
        parse_match_str(content, "<string>")
    }
}

/// High-level result of reading one match record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedMatch {
    /// Unique id for this read
    pub id: String,
    /// Source file path
    pub source_path: String,
    /// Match metadata pulled from the cooked root node
    pub metadata: MatchMetadata,
    /// The cooked document tree
    #[serde(skip)]
    pub collection: Collection,
    /// Non-fatal observations collected while reading
    pub warnings: Vec<String>,
}

impl ParsedMatch {
    /// Single-line JSON summary for log aggregation and archive indexes
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize match summary")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchMetadata {
    pub black_player: String,
    pub white_player: String,
    pub result: String,
    pub date: String,
    pub event: String,
    pub match_length: u32,
    pub game_count: usize,
    pub total_moves: usize,
}

/// Read and cook a match record from a file
pub fn parse_match_file(path: &Path) -> Result<ParsedMatch> {
    let outcome = Collection::parse_file(path);
    finish_parse(outcome, path.to_string_lossy().to_string())
}

/// Read and cook a match record from a string
pub fn parse_match_str(content: &str, source_path: &str) -> Result<ParsedMatch> {
    let outcome = Collection::parse(content.as_bytes());
    finish_parse(outcome, source_path.to_string())
}

fn finish_parse(
    outcome: crate::collection::ParseOutcome,
    source_path: String,
) -> Result<ParsedMatch> {
    let mut collection = outcome
        .into_result()
        .with_context(|| format!("Failed to parse SGF from {}", source_path))?;
    if collection.is_empty() {
        return Err(anyhow!("{}: no game trees in collection", source_path));
    }
    collection
        .cook()
        .with_context(|| format!("Failed to cook SGF properties from {}", source_path))?;

    let mut warnings = Vec::new();
    let first = &collection.game_trees()[0];
    if first.game_id() != "6" {
        warnings.push(format!(
            "Game id '{}' is not backgammon; generic typing applied.",
            first.game_id()
        ));
    }

    let metadata = extract_metadata(&collection);
    if metadata.match_length == 0 {
        warnings.push("No match length recorded; treating as money play.".to_string());
    }

    tracing::debug!(
        games = metadata.game_count,
        moves = metadata.total_moves,
        "parsed match record"
    );

    Ok(ParsedMatch {
        id: uuid::Uuid::new_v4().simple().to_string(),
        source_path,
        metadata,
        collection,
        warnings,
    })
}

fn root_simple_text(collection: &Collection, id: &str) -> String {
    collection
        .game_trees()
        .first()
        .and_then(|tree| tree.root_node())
        .and_then(|node| node.property(id))
        .and_then(|prop| prop.cooked())
        .and_then(|value| match value {
            CookedValue::SimpleText(s) | CookedValue::Text(s) => Some(s.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

fn extract_metadata(collection: &Collection) -> MatchMetadata {
    let match_length = collection
        .game_trees()
        .first()
        .and_then(|tree| tree.root_node())
        .and_then(|node| node.property("MI"))
        .and_then(|prop| prop.cooked())
        .and_then(|value| match value {
            CookedValue::MatchInfo(entries) => match entries.get("length") {
                Some(CookedValue::Number(n)) => Some(*n as u32),
                _ => None,
            },
            _ => None,
        })
        .unwrap_or(0);

    let total_moves = collection
        .game_trees()
        .iter()
        .map(|tree| main_line_moves(tree).len())
        .sum();

    MatchMetadata {
        black_player: root_simple_text(collection, "PB"),
        white_player: root_simple_text(collection, "PW"),
        result: root_simple_text(collection, "RE"),
        date: root_simple_text(collection, "DT"),
        event: root_simple_text(collection, "EV"),
        match_length,
        game_count: collection.len(),
        total_moves,
    }
}

/// The cooked moves along one game tree's main line, in document order
pub fn main_line_moves(tree: &crate::tree::GameTree) -> Vec<(CheckerColor, BgMove)> {
    let mut moves = Vec::new();
    for node in tree.nodes() {
        for (id, color) in [("B", CheckerColor::Black), ("W", CheckerColor::White)] {
            if let Some(CookedValue::Move(mv)) =
                node.property(id).and_then(|prop| prop.cooked())
            {
                moves.push((color, mv.clone()));
            }
        }
    }
    moves
}
