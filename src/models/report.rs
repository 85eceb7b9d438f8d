use serde::{Deserialize, Serialize};

/// 面向主管的合规报告
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// 表现、培训进度、风险意识与薄弱环节的总结
    pub report: String,
    /// 改进安全与合规的具体建议
    pub recommendations: String,
}

/// 推荐的安全课程
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub url: String,
}

impl Course {
    /// 名称非空且链接为 http(s) 地址
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && (self.url.starts_with("https://") || self.url.starts_with("http://"))
    }
}

/// 评测之后的完整报告：合规报告 + 课程推荐
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub compliance: ComplianceReport,
    pub courses: Vec<Course>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_validity() {
        let course = |name: &str, url: &str| Course {
            name: name.to_string(),
            url: url.to_string(),
        };

        assert!(course("Working at Height", "https://www.hse.gov.uk/work-at-height/").is_valid());
        assert!(!course("  ", "https://example.com").is_valid());
        assert!(!course("Ladder safety", "example.com/ladders").is_valid());
    }
}
