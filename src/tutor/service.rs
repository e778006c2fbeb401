//! Dialogue routing and the daily-list, lookup, and quiz flows.
//!
//! Intent detection is deliberately small: a fixed set of literal commands
//! plus a single-token-shape heuristic for word lookups. Anything else gets a
//! usage hint. All outbound text is clipped before it reaches the reply
//! channel.

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;
use tracing::{error, info, warn};

use crate::llm::TextGenerator;
use crate::store::{RecordFilter, VocabStore};
use crate::tutor::core::config::TutorConfig;
use crate::tutor::core::errors::{TutorError, TutorResult};
use crate::tutor::core::record::{VocabRecord, WrongAnswer};
use crate::tutor::parser::{LookupOutcome, parse_lookup_line, parse_vocab_lines};
use crate::tutor::prompts::{lookup_prompt, vocab_prompt};
use crate::tutor::quiz::{NumberedQuestion, QuizEngine, QuizStep};
use crate::tutor::rotation::{theme_for_date, today_date_string};

/// Option letters in display order.
const OPTION_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// Source tag for rows written by the daily flow.
const SOURCE_DAILY: &str = "daily";
/// Source tag for rows written by the lookup flow.
const SOURCE_LOOKUP: &str = "lookup";
/// Quiz type tag recorded with missed questions.
const QUIZ_TYPE: &str = "zh_to_word";

/// The tutor service: one instance handles all users.
pub struct TutorService {
    config: TutorConfig,
    generator: Arc<dyn TextGenerator>,
    store: Arc<dyn VocabStore>,
    quiz: QuizEngine,
    word_shape: Regex,
}

impl TutorService {
    /// Build the service, validating the configuration first.
    ///
    /// # Errors
    /// Returns [`TutorError::InvalidConfig`] when the configuration is
    /// invalid.
    pub fn new(
        config: TutorConfig,
        generator: Arc<dyn TextGenerator>,
        store: Arc<dyn VocabStore>,
    ) -> TutorResult<Self> {
        config.validate()?;
        let quiz = QuizEngine::new(config.quiz.question_count);
        let word_shape = Regex::new(r"^[A-Za-z][A-Za-z'\-]*$")
            .map_err(|err| TutorError::InvalidConfig(format!("word shape regex: {err}")))?;
        Ok(Self {
            config,
            generator,
            store,
            quiz,
            word_shape,
        })
    }

    /// Handle one incoming message and produce the reply text.
    ///
    /// Never fails: recoverable errors become user-facing corrective prompts,
    /// everything else becomes a generic apology. The reply is truncated to
    /// the configured maximum length.
    pub async fn handle_message(&self, user_key: &str, text: &str) -> String {
        let reply = match self.dispatch(user_key, text).await {
            Ok(reply) => reply,
            Err(err) => self.reply_for_error(&err),
        };
        truncate_reply(reply, self.config.reply.max_chars)
    }

    async fn dispatch(&self, user_key: &str, text: &str) -> TutorResult<String> {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();

        // An in-flight quiz claims single-letter input first, so a learner
        // answering "a" is not treated as looking up the word "a".
        if is_answer_shape(trimmed) && self.quiz.has_active_session(user_key) {
            return self.handle_answer(user_key, trimmed).await;
        }

        match lower.as_str() {
            "hi" | "hello" | "哈囉" => Ok(greeting_text()),
            "/today" | "vocab" | "單字" => self.handle_daily(user_key).await,
            "/quiz" | "/quiz5" | "測驗" => self.handle_quiz_start(user_key).await,
            "/stop" | "結束測驗" => Ok(self.handle_stop(user_key)),
            _ if self.word_shape.is_match(trimmed) => self.handle_lookup(user_key, trimmed).await,
            _ => Ok(help_text()),
        }
    }

    /// The rotating daily list: reuse what is already stored for (today,
    /// theme), generate only the shortfall, and persist the new rows.
    ///
    /// Not transactional across the store: a partial write followed by a
    /// crash leaves fewer rows than requested, and the next invocation
    /// re-checks the stored count instead of assuming the write completed.
    async fn handle_daily(&self, user_key: &str) -> TutorResult<String> {
        let rotation = &self.config.rotation;
        let date = today_date_string(rotation.utc_offset_minutes);
        let theme = theme_for_date(&date, &rotation.themes, &rotation.anchor_date)?.to_string();

        let filter = RecordFilter {
            theme: Some(theme.clone()),
            date: Some(date.clone()),
        };
        let mut items = self.store.read_records(&filter, rotation.daily_count).await?;
        info!(user_key, %theme, %date, stored = items.len(), "daily list requested");

        if items.len() < rotation.daily_count {
            let shortfall = rotation.daily_count - items.len();
            let banned: Vec<String> = self
                .store
                .read_all()
                .await?
                .into_iter()
                .map(|r| r.word)
                .collect();

            let raw = self
                .generator
                .generate(&vocab_prompt(&theme, shortfall, &banned))
                .await?;
            let fresh = parse_vocab_lines(
                &raw,
                &self.config.parser,
                &rotation.themes,
                &theme,
                shortfall,
            )?;
            self.store.append_records(&fresh, SOURCE_DAILY).await?;
            items.extend(fresh);
        }

        Ok(format_daily_list(&theme, &date, &items))
    }

    async fn handle_lookup(&self, user_key: &str, raw_word: &str) -> TutorResult<String> {
        let word = raw_word.trim().to_lowercase();
        info!(user_key, %word, "word lookup requested");

        let raw = self.generator.generate(&lookup_prompt(&word)).await?;
        let outcome = match parse_lookup_line(&raw, &self.config.parser, &word) {
            Ok(outcome) => outcome,
            // The backend answered but not in the agreed shape; hand the
            // learner its text rather than nothing.
            Err(TutorError::Parse { raw }) => {
                warn!(word, "lookup response had no data line, replying verbatim");
                return Ok(raw);
            }
            Err(err) => return Err(err),
        };

        match outcome {
            LookupOutcome::NotAWord => Ok(not_a_word_text(&word)),
            LookupOutcome::Entry(record) => {
                if self.store.word_exists(&record.word).await? {
                    info!(word = %record.word, "already stored, skipping append");
                } else {
                    self.store
                        .append_records(std::slice::from_ref(&record), SOURCE_LOOKUP)
                        .await?;
                }
                Ok(format_lookup_card(&record))
            }
        }
    }

    async fn handle_quiz_start(&self, user_key: &str) -> TutorResult<String> {
        let pool = self.store.read_all().await?;
        let first = self.quiz.start_session(user_key, &pool)?;
        info!(user_key, total = first.total, "quiz session started");
        Ok(format_question(&first))
    }

    async fn handle_answer(&self, user_key: &str, answer: &str) -> TutorResult<String> {
        let outcome = self.quiz.submit_answer(user_key, answer)?;

        if !outcome.correct {
            let missed = WrongAnswer {
                user_key: user_key.to_string(),
                word: outcome.answer_word.clone(),
                zh: outcome.prompt_zh.clone(),
                chosen: outcome.chosen.clone(),
                options: outcome.options.clone(),
                quiz_type: QUIZ_TYPE.to_string(),
                answered_at: Utc::now(),
            };
            // Best effort: a store hiccup must not eat the quiz turn.
            if let Err(err) = self.store.append_wrong_answers(&[missed]).await {
                warn!(user_key, %err, "failed to record wrong answer");
            }
        }

        let feedback = if outcome.correct {
            "✅ 答對了！".to_string()
        } else {
            format!("❌ 答錯了，正確答案是「{}」", outcome.answer_word)
        };

        Ok(match outcome.step {
            QuizStep::Next(next) => format!("{feedback}\n\n{}", format_question(&next)),
            QuizStep::Finished(summary) => format!(
                "{feedback}\n\n🎉 測驗結束！你答對了 {}/{} 題（{}%）\n想再玩一次可以輸入 /quiz",
                summary.correct,
                summary.total,
                summary.percent()
            ),
        })
    }

    fn handle_stop(&self, user_key: &str) -> String {
        if self.quiz.abandon_session(user_key) {
            "好的，已結束這次測驗！想再玩可以輸入 /quiz".to_string()
        } else {
            "目前沒有進行中的測驗喔！輸入 /quiz 開始一回合吧！".to_string()
        }
    }

    fn reply_for_error(&self, err: &TutorError) -> String {
        match err {
            TutorError::InsufficientPool { have, need } => format!(
                "單字量還不夠喔！目前只有 {have} 個單字，至少需要 {need} 個才能出題。\n\
                 先用 /today 或查單字累積一些吧！"
            ),
            TutorError::NoActiveSession => {
                "目前沒有進行中的測驗，輸入 /quiz 開始一回合吧！".to_string()
            }
            TutorError::InvalidAnswer(_) => {
                "請回覆 A / B / C / D（或 1–4）其中一個選項喔！".to_string()
            }
            TutorError::Parse { .. } => {
                warn!("generated text yielded zero records");
                "抱歉，這次的內容我讀不太懂，請再試一次！".to_string()
            }
            other => {
                error!(%other, "message handling failed");
                "抱歉，我這邊出了點問題，請稍後再試一次！".to_string()
            }
        }
    }
}

/// Clip a reply to `max_chars` characters.
fn truncate_reply(reply: String, max_chars: usize) -> String {
    if reply.chars().count() <= max_chars {
        reply
    } else {
        reply.chars().take(max_chars).collect()
    }
}

fn is_answer_shape(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => matches!(ch.to_ascii_lowercase(), 'a'..='d' | '1'..='4'),
        _ => false,
    }
}

fn greeting_text() -> String {
    "嗨～我是你的英文單字 Bot！\n\
     想看今天的單字可以輸入：單字 或 vocab 或 /today\n\
     想測驗可以輸入：/quiz，查單字直接打英文單字就可以囉～"
        .to_string()
}

fn help_text() -> String {
    "我看不太懂這個指令 ><\n\
     想看單字請傳：單字 或 vocab 或 /today\n\
     想測驗請傳：/quiz，查單字直接打英文單字就可以囉～"
        .to_string()
}

fn not_a_word_text(word: &str) -> String {
    format!(
        "看起來「{word}」不是常見的英文單字，可能是打錯字或是自創字喔！\n\n\
         可以再檢查看看拼字，或改查另一個單字～"
    )
}

fn format_daily_list(theme: &str, date: &str, items: &[VocabRecord]) -> String {
    let entries: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut lines = vec![format!("{}. {} ({}) - {}", i + 1, item.word, item.pos, item.zh)];
            if !item.example.is_empty() {
                lines.push(format!("   {}", item.example));
            }
            if !item.example_zh.is_empty() {
                lines.push(format!("   {}", item.example_zh));
            }
            lines.join("\n")
        })
        .collect();

    format!(
        "📅 {date} 今天的主題：{theme}\n\n{}",
        entries.join("\n\n")
    )
}

fn format_lookup_card(record: &VocabRecord) -> String {
    let mut lines = vec![format!("📚 Word: {}", record.word)];
    if !record.pos.is_empty() {
        lines.push(format!("詞性：{}", record.pos));
    }
    if !record.zh.is_empty() {
        lines.push(format!("中文：{}", record.zh));
    }
    if !record.cefr.is_empty() {
        lines.push(format!("CEFR：{}", record.cefr));
    }
    lines.push(String::new());
    lines.push("例句：".to_string());
    if !record.example.is_empty() {
        lines.push(format!("- {}", record.example));
    }
    if !record.example_zh.is_empty() {
        lines.push(format!("→ {}", record.example_zh));
    }
    lines.join("\n")
}

fn format_question(numbered: &NumberedQuestion) -> String {
    let options: Vec<String> = numbered
        .question
        .options
        .iter()
        .zip(OPTION_LETTERS)
        .map(|(option, letter)| format!("{letter}. {option}"))
        .collect();

    format!(
        "📝 第 {}/{} 題\n「{}」是哪一個單字呢？\n\n{}\n\n請回覆 A / B / C / D",
        numbered.number,
        numbered.total,
        numbered.question.prompt_zh,
        options.join("\n")
    )
}
