//! Minimal WordprocessingML writer for the statistics press release and for
//! documents converted from extracted text.
//!
//! The package holds only the parts Word needs to open the file: content
//! types, the package relationship, the main document and a style sheet
//! defining the title and heading styles used below.

use super::dates::korean_date;
use super::{escape_markup, RenderError};
use crate::statistics::{StatisticKey, StatisticsResult};
use crate::table::format_float;
use chrono::NaiveDate;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Section 2 lists these keys in this order; headings are numbered by
/// position here, so absent keys leave gaps.
pub const PRESS_RELEASE_ORDER: [StatisticKey; 11] = [
    StatisticKey::OverallMean,
    StatisticKey::MaxIndex,
    StatisticKey::MinIndex,
    StatisticKey::Recent1yMean,
    StatisticKey::Recent3yMean,
    StatisticKey::AnnualGrowthRate,
    StatisticKey::Volatility,
    StatisticKey::TopGrowthCategory,
    StatisticKey::BottomGrowthCategory,
    StatisticKey::Top3CategoryMeans,
    StatisticKey::RecentTrend,
];

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:eastAsia="Malgun Gothic"/><w:sz w:val="22"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:pPr><w:spacing w:after="120"/></w:pPr></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:pPr><w:spacing w:after="240"/></w:pPr><w:rPr><w:b/><w:sz w:val="48"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="240"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:pPr><w:keepNext/><w:spacing w:before="200"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style></w:styles>"#;

/// Build the press-release `.docx` for a press-release statistics result.
pub fn press_release_docx(
    stats: &StatisticsResult,
    created_on: NaiveDate,
) -> Result<Vec<u8>, RenderError> {
    package(&document_xml(stats, created_on))
}

/// Build a `.docx` from blank-line separated markdown-ish paragraphs. Lines
/// inside a paragraph are joined with a space; a paragraph opening with `#`
/// becomes a heading.
pub fn paragraphs_docx<S: AsRef<str>>(paragraphs: &[S]) -> Result<Vec<u8>, RenderError> {
    let mut body = Body::default();
    for paragraph in paragraphs {
        let text = paragraph
            .as_ref()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            continue;
        }
        match heading_level(&text) {
            Some((level, title)) => body.heading(level, title),
            None => body.paragraph(&text),
        }
    }
    package(&wrap_document(&body))
}

/// `# title` is level 1; deeper markers collapse to level 2.
fn heading_level(text: &str) -> Option<(u8, &str)> {
    let hashes = text.chars().take_while(|ch| *ch == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let title = text[hashes..].strip_prefix(' ')?.trim();
    if title.is_empty() {
        return None;
    }
    Some((if hashes == 1 { 1 } else { 2 }, title))
}

fn package(document: &str) -> Result<Vec<u8>, RenderError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", STYLES),
        ("word/document.xml", document),
    ] {
        writer.start_file(name, options)?;
        writer.write_all(contents.as_bytes())?;
    }
    Ok(writer.finish()?.into_inner())
}

#[derive(Default)]
struct Body {
    xml: String,
}

impl Body {
    fn styled(&mut self, style: &str, centered: bool, runs: &[(&str, bool)]) {
        self.xml.push_str("<w:p>");
        if !style.is_empty() || centered {
            self.xml.push_str("<w:pPr>");
            if !style.is_empty() {
                self.xml.push_str(&format!("<w:pStyle w:val=\"{style}\"/>"));
            }
            if centered {
                self.xml.push_str("<w:jc w:val=\"center\"/>");
            }
            self.xml.push_str("</w:pPr>");
        }
        for (text, bold) in runs {
            self.xml.push_str("<w:r>");
            if *bold {
                self.xml.push_str("<w:rPr><w:b/></w:rPr>");
            }
            self.xml.push_str(&format!(
                "<w:t xml:space=\"preserve\">{}</w:t></w:r>",
                escape_markup(text)
            ));
        }
        self.xml.push_str("</w:p>");
    }

    fn heading(&mut self, level: u8, text: &str) {
        self.styled(&format!("Heading{level}"), false, &[(text, false)]);
    }

    fn paragraph(&mut self, text: &str) {
        self.styled("", false, &[(text, false)]);
    }

    fn labeled(&mut self, label: &str, value: &str) {
        self.styled("", false, &[(label, true), (value, false)]);
    }

    fn blank(&mut self) {
        self.xml.push_str("<w:p/>");
    }
}

fn document_xml(stats: &StatisticsResult, created_on: NaiveDate) -> String {
    let mut body = Body::default();
    body.styled(
        "Title",
        true,
        &[("지출목적별 소비자물가지수 주요 통계 분석", false)],
    );
    let created = format!("작성일: {}", korean_date(created_on));
    body.styled("", true, &[(created.as_str(), false)]);
    body.blank();

    body.heading(1, "1. 분석 개요");
    body.paragraph(
        "본 보고서는 지출목적별 소비자물가지수 데이터를 분석하여 주요 통계량을 도출하고, \
         물가 동향을 종합적으로 분석한 결과를 제시합니다.",
    );
    body.blank();

    body.heading(1, "2. 주요 통계량");
    for (position, key) in PRESS_RELEASE_ORDER.iter().enumerate() {
        let Some(record) = stats.get(*key) else {
            continue;
        };
        body.heading(2, &format!("2.{} {}", position + 1, record.description()));
        if let Some(value) = record.value() {
            let text = match record.unit() {
                Some(unit) => format!("{} {}", format_float(value), unit.symbol()),
                None => format_float(value),
            };
            body.labeled("값: ", &text);
        }
        if let Some(date) = record.date() {
            body.labeled("시점: ", &date.to_string());
        }
        if let Some(category) = record.category() {
            body.labeled("지출목적: ", category);
        }
        for category in record.categories() {
            body.labeled(
                &format!("• {}: ", category.name),
                &format_float(category.value),
            );
        }
        if let Some(trend) = record.trend() {
            body.labeled("추세: ", trend.label());
        }
        body.blank();
    }

    body.heading(1, "3. 종합 분석");
    for line in summary_lines(stats) {
        body.paragraph(&line);
    }

    wrap_document(&body)
}

fn wrap_document(body: &Body) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{}<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>\
         <w:pgMar w:top=\"1440\" w:right=\"1440\" w:bottom=\"1440\" w:left=\"1440\" \
         w:header=\"720\" w:footer=\"720\" w:gutter=\"0\"/></w:sectPr></w:body></w:document>",
        body.xml
    )
}

fn summary_lines(stats: &StatisticsResult) -> Vec<String> {
    let value = |key: StatisticKey| {
        stats
            .get(key)
            .and_then(|record| record.value())
            .map_or_else(|| "N/A".to_string(), format_float)
    };
    let trend = stats.get(StatisticKey::RecentTrend);
    let trend_label = trend
        .and_then(|record| record.trend())
        .map_or("N/A", |trend| trend.label());
    let trend_change = trend
        .and_then(|record| record.value())
        .map_or_else(|| "0".to_string(), |value| format_float(value.abs()));

    vec![
        format!(
            "전체 기간 평균 소비자물가지수는 {}로 나타났으며, 최근 1년 평균은 {}입니다.",
            value(StatisticKey::OverallMean),
            value(StatisticKey::Recent1yMean)
        ),
        format!(
            "연평균 증가율은 {}%로, 물가가 지속적으로 상승하는 추세를 보이고 있습니다.",
            value(StatisticKey::AnnualGrowthRate)
        ),
        format!(
            "최근 6개월 추세는 {trend_label} 추세로, 이전 6개월 대비 {trend_change}% 변화를 보였습니다."
        ),
    ]
}
