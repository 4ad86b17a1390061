use crate::parser::ClassOccurrence;

const TZID: &str = "Asia/Shanghai";
const DATE_FORMAT: &str = "%Y%m%d";
const TIME_FORMAT: &str = "%H%M%S";

/// Render a complete iCalendar document: fixed header and UTC+8 timezone
/// block, one VEVENT (with a 30-minutes-before VALARM) per occurrence in
/// input order, closing footer.
///
/// Output is deterministic: the same occurrence list yields byte-identical
/// text. The only escaping performed is newline substitution inside the
/// description; commas and semicolons in text fields pass through as-is.
pub fn render_calendar(title: &str, occurrences: &[ClassOccurrence]) -> String {
    let mut payload = format!(
        "BEGIN:VCALENDAR\n\
         VERSION:2.0\n\
         X-WR-CALNAME:{title}\n\
         CALSCALE:GREGORIAN\n\
         BEGIN:VTIMEZONE\n\
         TZID:{TZID}\n\
         TZURL:http://tzurl.org/zoneinfo-outlook/{TZID}\n\
         X-LIC-LOCATION:{TZID}\n\
         BEGIN:STANDARD\n\
         TZOFFSETFROM:+0800\n\
         TZOFFSETTO:+0800\n\
         TZNAME:CST\n\
         DTSTART:19700101T000000\n\
         END:STANDARD\n\
         END:VTIMEZONE"
    );
    for occurrence in occurrences {
        payload.push_str(&render_event(occurrence));
    }
    payload.push_str("\nEND:VCALENDAR");
    payload
}

fn render_event(occurrence: &ClassOccurrence) -> String {
    let date = occurrence.date.format(DATE_FORMAT);
    let start = occurrence.start.format(TIME_FORMAT);
    let end = occurrence.end.format(TIME_FORMAT);
    let description = format!(
        "编号：{}\n名称：{}\n教师：{}\n学分：{}\n上课时间：{}；第 {} 节",
        occurrence.course_id,
        occurrence.course_name,
        occurrence.teacher,
        occurrence.credit,
        occurrence.course_time,
        occurrence.lessons,
    )
    .replace('\n', "\\n");
    format!(
        "\nBEGIN:VEVENT\n\
         DESCRIPTION:{description}\n\
         DTSTART;TZID={TZID}:{date}T{start}\n\
         DTEND;TZID={TZID}:{date}T{end}\n\
         LOCATION:{location}\n\
         SUMMARY:{summary}\n\
         BEGIN:VALARM\n\
         TRIGGER:-PT30M\n\
         REPEAT:1\n\
         DURATION:PT1M\n\
         END:VALARM\n\
         END:VEVENT",
        location = occurrence.location,
        summary = occurrence.course_name,
    )
}
