//! 命名约定
//!
//! 组件标识、属性 ref 和描述的规范化规则

/// 路径参数 ref 前缀
pub const PATH_PARAMETER_PREFIX: &str = "elyra_path_";
/// 与输入冲突的输出参数 ref 前缀
pub const OUTPUT_COLLISION_PREFIX: &str = "output_";

/// 由显示名称推导组件标识
///
/// 小写，去掉连字符，合并空白，空格和下划线替换为连字符。
/// 例如 `"Run Spark-Job_v2"` -> `"run-sparkjob-v2"`。
pub fn id_from_name(name: &str) -> String {
    name.to_lowercase()
        .replace('-', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .replace('_', "-")
}

/// 合并描述中的连续空白并去掉首尾空白
pub fn normalize_description(description: &str) -> String {
    description.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 由参数名推导属性 ref：小写，空格替换为下划线
pub fn parameter_ref(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// 路径参数的 ref
pub fn path_parameter_ref(base_ref: &str) -> String {
    format!("{}{}", PATH_PARAMETER_PREFIX, base_ref)
}

/// 每个单词首字母大写，其余字母小写
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                result.extend(ch.to_uppercase());
            } else {
                result.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(ch);
            at_word_start = true;
        }
    }
    result
}

/// 由文件名推导显示名称：`bash_operator` -> `Bash Operator`
pub fn display_name_from_file_stem(stem: &str) -> String {
    title_case(&stem.split('_').collect::<Vec<_>>().join(" "))
}
