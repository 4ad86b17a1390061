use serde::Deserialize;
use serde_json::Value;

/// One arranged-class record as the schedule endpoint returns it.
///
/// Only the fields the exporter consumes are modeled; the endpoint sends a
/// lot more that is ignored during deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawClassEntry {
    pub course_code: String,
    pub course_name: String,
    /// Sent as a number for most courses and a string for some, so it is
    /// kept as raw JSON and rendered verbatim.
    #[serde(default)]
    pub credit: Value,
    /// Free-form detail lines; the second-to-last one reads like
    /// `张三/1周,3-4周` and carries the teacher name and week ranges.
    pub title_detail: Vec<String>,
    /// Wall-clock start time, `HH:MM`.
    pub begin_time: String,
    /// Wall-clock end time, `HH:MM`.
    pub end_time: String,
    /// 1-based weekday index, 1 = Monday.
    pub day_of_week: u32,
    pub place_name: String,
    /// Timetable-cell lines; element 3 reads like `1-2节` and carries the
    /// lesson label.
    pub cell_detail: Vec<CellDetail>,
}

impl RawClassEntry {
    pub(crate) fn credit_text(&self) -> String {
        match &self.credit {
            Value::String(credit) => credit.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CellDetail {
    pub text: String,
}

/// Envelope the schedule endpoint wraps its payload in.
#[derive(Debug, Deserialize)]
pub(crate) struct ScheduleResponse {
    pub datas: Option<ScheduleData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScheduleData {
    #[serde(default)]
    pub arranged_list: Vec<RawClassEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_envelope() {
        let body = r#"{
            "datas": {
                "arrangedList": [{
                    "courseCode": "B1A0011A",
                    "courseName": "高等数学",
                    "credit": 6,
                    "titleDetail": ["高等数学", "张三/1-8周,10周", "学院路"],
                    "beginTime": "08:00",
                    "endTime": "09:40",
                    "dayOfWeek": 1,
                    "placeName": "主M101",
                    "cellDetail": [
                        {"text": "高等数学"},
                        {"text": "张三"},
                        {"text": "主M101"},
                        {"text": "1-2节"}
                    ]
                }]
            }
        }"#;
        let response: ScheduleResponse = serde_json::from_str(body).unwrap();
        let entries = response.datas.unwrap().arranged_list;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].course_code, "B1A0011A");
        assert_eq!(entries[0].day_of_week, 1);
        assert_eq!(entries[0].credit_text(), "6");
        assert_eq!(entries[0].cell_detail[3].text, "1-2节");
    }

    #[test]
    fn missing_datas_deserializes_to_none() {
        let response: ScheduleResponse = serde_json::from_str(r#"{"code": "failed"}"#).unwrap();
        assert!(response.datas.is_none());
    }

    #[test]
    fn string_credit_renders_unquoted() {
        let entry: RawClassEntry = serde_json::from_str(
            r#"{
                "courseCode": "X", "courseName": "X", "credit": "2.5",
                "titleDetail": ["李四/1周"], "beginTime": "08:00", "endTime": "08:45",
                "dayOfWeek": 1, "placeName": "X", "cellDetail": []
            }"#,
        )
        .unwrap();
        assert_eq!(entry.credit_text(), "2.5");
    }
}
