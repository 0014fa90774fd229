//! User-facing texts.

use chrono::FixedOffset;

use stayclock_core::billing::{format_duration, FeeResult};
use stayclock_core::session::Session;
use stayclock_core::utils::format_timestamp;

pub const NO_SESSION_NOTICE: &str = "入室記録がありません。";
pub const ADMIN_ONLY_NOTICE: &str = "この機能は管理者のみ利用可能です。";
pub const INVALID_COMMAND_NOTICE: &str = "有効なコマンドを入力してください。";

pub fn session_started(session: &Session, offset: FixedOffset) -> String {
    format!("利用開始時刻: {}", format_timestamp(session.start_time, offset))
}

/// The three bubbles sent on exit: end time, duration, fee.
pub fn session_ended(
    end_time: chrono::DateTime<chrono::Utc>,
    result: &FeeResult,
    offset: FixedOffset,
) -> Vec<String> {
    vec![
        format!("利用終了時刻: {}", format_timestamp(end_time, offset)),
        format!("利用時間: {}", format_duration(result.duration)),
        format!("料金: {}円", result.fee),
    ]
}

/// LINE rejects text messages longer than this many characters.
pub const MAX_TEXT_CHARS: usize = 5000;

/// The admin listing, split into bubbles of at most `MAX_TEXT_CHARS`.
///
/// The header opens the first bubble and session lines are never cut.
pub fn usage_history(sessions: &[Session], offset: FixedOffset) -> Vec<String> {
    let mut bubbles = Vec::new();
    let mut current = String::from("利用履歴:\n");
    let mut current_chars = current.chars().count();

    for session in sessions {
        let line = format!(
            "ユーザーID: {}, 開始時刻: {}\n",
            session.user_id,
            format_timestamp(session.start_time, offset)
        );
        let line_chars = line.chars().count();
        if current_chars + line_chars > MAX_TEXT_CHARS && !current.is_empty() {
            bubbles.push(std::mem::take(&mut current));
            current_chars = 0;
        }
        current.push_str(&line);
        current_chars += line_chars;
    }

    bubbles.push(current);
    bubbles
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use stayclock_core::utils::fixed_offset;

    #[test]
    fn test_session_ended_bubbles() {
        let end = Utc.with_ymd_and_hms(2024, 4, 1, 3, 0, 0).unwrap();
        let result = FeeResult {
            duration: Duration::minutes(90),
            fee: 1500,
        };

        let texts = session_ended(end, &result, fixed_offset(540));
        assert_eq!(
            texts,
            vec![
                "利用終了時刻: 2024-04-01 12:00:00",
                "利用時間: 1:30:00",
                "料金: 1500円",
            ]
        );
    }

    #[test]
    fn test_empty_history_has_only_header() {
        assert_eq!(usage_history(&[], fixed_offset(0)), vec!["利用履歴:\n"]);
    }

    #[test]
    fn test_history_lists_each_session() {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let sessions = vec![
            Session {
                user_id: "U1".into(),
                start_time: start,
            },
            Session {
                user_id: "U2".into(),
                start_time: start + Duration::minutes(5),
            },
        ];

        let texts = usage_history(&sessions, fixed_offset(0));
        assert_eq!(texts.len(), 1);
        assert_eq!(
            texts[0],
            "利用履歴:\n\
             ユーザーID: U1, 開始時刻: 2024-04-01 00:00:00\n\
             ユーザーID: U2, 開始時刻: 2024-04-01 00:05:00\n"
        );
    }

    #[test]
    fn test_long_history_is_split_under_line_limit() {
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
        let sessions: Vec<Session> = (0..400)
            .map(|i| Session {
                user_id: format!("U{:032}", i),
                start_time: start + Duration::seconds(i),
            })
            .collect();

        let texts = usage_history(&sessions, fixed_offset(540));

        assert!(texts.len() > 1);
        assert!(texts.iter().all(|t| t.chars().count() <= MAX_TEXT_CHARS));
        assert!(texts[0].starts_with("利用履歴:\n"));
        assert!(texts[1..].iter().all(|t| t.starts_with("ユーザーID: ")));

        // Every session appears exactly once, in order.
        let joined = texts.concat();
        let lines: Vec<&str> = joined.lines().skip(1).collect();
        assert_eq!(lines.len(), 400);
        assert!(lines[0].contains(&format!("U{:032}", 0)));
        assert!(lines[399].contains(&format!("U{:032}", 399)));
    }
}
