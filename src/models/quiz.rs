use serde::Serialize;

/// 题目类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    /// 选择题（有 >= 2 个选项）
    MultipleChoice,
    /// 简答题（无选项）
    Text,
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "multiple-choice"),
            QuestionType::Text => write!(f, "text"),
        }
    }
}

/// 解析后的单道题目
///
/// 只能由解析器构造，构造后不可变：
/// - `question` 已去除编号并 trim，长度 >= 5
/// - `options` 要么是 `None`，要么包含至少 2 个选项
/// - `question_type` 由 `options` 推导
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizQuestion {
    question: String,
    options: Option<Vec<String>>,
    #[serde(rename = "type")]
    question_type: QuestionType,
}

impl QuizQuestion {
    /// 题干最短长度（字符数）
    pub const MIN_STEM_CHARS: usize = 5;

    /// 从题干和候选选项构造题目
    ///
    /// 题干不足 5 个字符时返回 `None`；少于 2 个选项时降级为简答题。
    pub(crate) fn from_parts(stem: &str, candidates: Vec<String>) -> Option<Self> {
        let question = stem.trim();
        if question.chars().count() < Self::MIN_STEM_CHARS {
            return None;
        }

        let (options, question_type) = if candidates.len() >= 2 {
            (Some(candidates), QuestionType::MultipleChoice)
        } else {
            (None, QuestionType::Text)
        };

        Some(Self {
            question: question.to_string(),
            options,
            question_type,
        })
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn options(&self) -> Option<&[String]> {
        self.options.as_deref()
    }

    pub fn question_type(&self) -> QuestionType {
        self.question_type
    }

    pub fn is_multiple_choice(&self) -> bool {
        self.question_type == QuestionType::MultipleChoice
    }

    /// 题干 + 选项行（不带编号），用于结果记录
    pub fn display_text(&self) -> String {
        let mut text = self.question.clone();
        for (idx, option) in self.options().unwrap_or_default().iter().enumerate() {
            text.push('\n');
            text.push_str(&format!("{}) {}", option_letter(idx), option));
        }
        text
    }
}

/// 选项字母，A-D 循环，保证重新序列化后仍能被解析
fn option_letter(idx: usize) -> char {
    (b'A' + (idx % 4) as u8) as char
}

/// 一次生成得到的完整测验，保持原文顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Quiz {
    questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub(crate) fn new(questions: Vec<QuizQuestion>) -> Self {
        Self { questions }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuizQuestion> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuizQuestion> {
        self.questions.iter()
    }

    pub fn multiple_choice_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.is_multiple_choice())
            .count()
    }

    /// 按 `N. 题干` + `A) 选项` 的格式重新序列化
    ///
    /// 题目之间用空行分隔，输出可以被解析器原样解析回来。
    pub fn to_text(&self) -> String {
        self.questions
            .iter()
            .enumerate()
            .map(|(i, q)| format!("{}. {}", i + 1, q.display_text()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl<'a> IntoIterator for &'a Quiz {
    type Item = &'a QuizQuestion;
    type IntoIter = std::slice::Iter<'a, QuizQuestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_stem_is_rejected() {
        assert!(QuizQuestion::from_parts("  Why ", vec![]).is_none());
        assert!(QuizQuestion::from_parts("Why??", vec![]).is_some());
    }

    #[test]
    fn test_single_option_demotes_to_text() {
        let q = QuizQuestion::from_parts("What is PPE?", vec!["Gloves".to_string()]).unwrap();
        assert_eq!(q.question_type(), QuestionType::Text);
        assert!(q.options().is_none());
    }

    #[test]
    fn test_serialize_shape() {
        let q = QuizQuestion::from_parts(
            "What is PPE?",
            vec!["Shoes".to_string(), "Helmet".to_string()],
        )
        .unwrap();
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(value["question"], "What is PPE?");
        assert_eq!(value["options"][1], "Helmet");
        assert_eq!(value["type"], "multiple-choice");

        let text = QuizQuestion::from_parts("Describe the route.", vec![]).unwrap();
        let value = serde_json::to_value(&text).unwrap();
        assert!(value["options"].is_null());
        assert_eq!(value["type"], "text");
    }

    #[test]
    fn test_option_letters_cycle() {
        let options: Vec<String> = (0..5).map(|i| format!("opt {}", i)).collect();
        let q = QuizQuestion::from_parts("Pick one of these", options).unwrap();
        let text = q.display_text();
        assert!(text.ends_with("A) opt 4"));
        assert!(text.contains("D) opt 3"));
    }
}
