use serde::{Deserialize, Serialize};

/// 用户画像，用于生成定制化的安全测验
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileData {
    /// 公司类型 / 行业
    pub company_type: String,
    /// 岗位
    pub job_role: String,
    /// 岗位描述
    pub job_description: String,
}

impl ProfileData {
    /// 返回第一个为空的字段名
    pub fn first_blank_field(&self) -> Option<&'static str> {
        [
            ("company_type", &self.company_type),
            ("job_role", &self.job_role),
            ("job_description", &self.job_description),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

impl std::fmt::Display for ProfileData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} / {}]", self.company_type, self.job_role)
    }
}
