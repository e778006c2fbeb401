//! Prompt templates for the generative backend.
//!
//! The pipe-delimited single-line record format requested here is an internal
//! contract between these templates and the parser, not a persisted format.
//! The parser never trusts it anyway.

/// Cap on banned words embedded in a generation prompt.
const MAX_BANNED_WORDS: usize = 2000;

/// Prompt for a themed batch of `count` vocabulary entries.
#[must_use]
pub fn vocab_prompt(theme: &str, count: usize, banned_words: &[String]) -> String {
    let banned_text = if banned_words.is_empty() {
        "如果可以的話，盡量不要跟很常見的基礎字完全重複。".to_string()
    } else {
        format!(
            "請避免使用以下已出現過的單字（含大小寫與詞形變化）：{}。",
            banned_words
                .iter()
                .take(MAX_BANNED_WORDS)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )
    };

    format!(
        "你是一位專業英語教學編輯，讀者是 TOEIC 大約 400–700 分的上班族（CEFR A2–B1 為主，少量 B2）。\n\
         \n\
         主題是：「{theme}」。\n\
         \n\
         請產生「{count} 個」實用英文單字或短片語，難度大約 A2–B2。\n\
         {banned_text}\n\
         \n\
         ⚠ 請用「一行一個」的方式輸出，每行格式嚴格如下（使用半形直線 | 當分隔）：\n\
         \n\
         word | pos | zh | example | example_zh | cefr\n\
         \n\
         說明：\n\
         - word：單字或常用片語（例如 follow up），不用加引號。\n\
         - pos：詞性，使用縮寫，例如 n. / v. / adj. / adv.\n\
         - zh：繁體中文解釋，簡潔自然。\n\
         - example：8–20 字的自然英文例句，生活或職場情境皆可。\n\
         - example_zh：例句的繁體中文翻譯。\n\
         - cefr：請填 A2/B1/B2 其中一個，依照該單字的難度估計。\n\
         \n\
         請注意：\n\
         - 一定要輸出「剛好 {count} 行」資料。\n\
         - 不要加上編號（不要 1. 2. 3.）。\n\
         - 不要加任何說明文字、標題、JSON、註解，只要一行一筆資料。"
    )
}

/// Prompt for a single-word lookup with the leading status token.
#[must_use]
pub fn lookup_prompt(word: &str) -> String {
    format!(
        "你是一位友善的雙語英文老師，現在要協助使用者查單字「{word}」。\n\
         \n\
         第一步：請先判斷這是不是正常的英文單字。\n\
         \n\
         【第一行：一行資料，給程式用】\n\
         只輸出一行，使用半形直線 | 分隔，格式必須完全符合：\n\
         \n\
         status | word | pos | zh | example | example_zh | cefr\n\
         \n\
         說明：\n\
         - status：如果是正常英文單字，請輸出 REAL；如果不是正常英文單字或很罕見的亂碼，請輸出 NOT_WORD。\n\
         - word：單字本身（小寫即可）\n\
         - pos：詞性（n. / v. / adj. / adv. 其一，必要時可以 n., v. 這樣）\n\
         - zh：最常用、最核心的繁體中文意思（只給一個簡短解釋）\n\
         - example：一個 8–20 字自然英文例句\n\
         - example_zh：例句的繁體中文翻譯\n\
         - cefr：A1~C2 中選一個最適合的等級\n\
         \n\
         如果 status 為 NOT_WORD，其餘欄位可以留空。\n\
         \n\
         ⚠ 禁止輸出任何額外說明、其他例句、星號、Markdown 標記或段落。"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocab_prompt_embeds_theme_and_count() {
        let prompt = vocab_prompt("travel", 5, &[]);
        assert!(prompt.contains("「travel」"));
        assert!(prompt.contains("「5 個」"));
        assert!(prompt.contains("word | pos | zh | example | example_zh | cefr"));
    }

    #[test]
    fn banned_words_are_listed_and_capped() {
        let banned: Vec<String> = (0..3000).map(|i| format!("w{i}")).collect();
        let prompt = vocab_prompt("work", 3, &banned);
        assert!(prompt.contains("w0"));
        assert!(prompt.contains("w1999"));
        assert!(!prompt.contains("w2000,"));
    }

    #[test]
    fn lookup_prompt_requests_the_status_token() {
        let prompt = lookup_prompt("rush");
        assert!(prompt.contains("「rush」"));
        assert!(prompt.contains("status | word | pos | zh | example | example_zh | cefr"));
        assert!(prompt.contains("NOT_WORD"));
    }
}
