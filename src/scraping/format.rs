//! 取得したテーブルをフロントエンド向けに整形する

use serde_json::Value;

use super::types::{PlayerRecord, RawHeader, RawRow, TeamStats};

/// ヘッダーと行を列番号キーの選手レコードに変換する
///
/// セル数がヘッダー数に満たない行は出力しない。
pub fn format_team_stats(team: &str, headers: &[RawHeader], rows: &[RawRow]) -> TeamStats {
    let header_names: Vec<String> = headers.iter().map(|h| h.text.clone()).collect();

    let players: Vec<PlayerRecord> = rows
        .iter()
        .filter(|row| row.cells.len() >= header_names.len())
        .map(|row| {
            row.cells
                .iter()
                .take(header_names.len())
                .enumerate()
                .map(|(i, cell)| (i.to_string(), Value::String(cell.text.clone())))
                .collect()
        })
        .collect();

    TeamStats {
        success: true,
        team: team.to_string(),
        total_players: players.len(),
        players,
        headers: header_names,
        error: None,
    }
}
