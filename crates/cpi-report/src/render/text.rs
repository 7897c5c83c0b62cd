use super::dates::{korean_date, korean_timestamp};
use crate::insights::{InsightPayload, InsightRecord};
use chrono::NaiveDateTime;

const RULE: &str = "===================================================================";

/// Plain-text press release summarizing upload insights in order.
pub fn insight_press_release(insights: &[InsightRecord], now: NaiveDateTime) -> String {
    let mut text = format!(
        "\n[보도자료]\n\n제목: 데이터 분석 결과 발표 - 주요 인사이트 5가지\n\n발표일: {}\n\n{RULE}\n\n1. 데이터 개요\n",
        korean_date(now.date())
    );

    for (position, insight) in insights.iter().enumerate() {
        text.push_str(&format!(
            "\n\n{}. {}\n   {}\n",
            position + 1,
            insight.title,
            insight.description
        ));
        text.push_str(&format!("   {}\n", paragraph(&insight.payload)));
    }

    text.push_str(&format!(
        "\n\n{RULE}\n\n본 분석 결과는 업로드된 엑셀 데이터를 기반으로 자동 생성되었습니다.\n\
         데이터 기반 의사결정에 활용하시기 바랍니다.\n\n분석 완료 시각: {}\n\n[끝]\n",
        korean_timestamp(now)
    ));
    text
}

fn paragraph(payload: &InsightPayload) -> String {
    match payload {
        InsightPayload::Summary { rows, columns, .. } => format!(
            "분석 대상 데이터는 {rows}건의 레코드로 구성되어 있으며, {columns}개의 주요 지표를 포함하고 있습니다."
        ),
        InsightPayload::MaxValue { column, value, .. } => format!(
            "{column} 항목에서 {value:.2}의 최고치를 기록하였으며, 이는 전체 데이터 중 가장 두드러진 성과로 평가됩니다."
        ),
        InsightPayload::Statistics { .. } => {
            "주요 지표들의 평균값을 분석한 결과, 데이터의 안정성과 변동성을 확인할 수 있었습니다."
                .to_string()
        }
        InsightPayload::Trend { trend, change, .. } => format!(
            "데이터 추세 분석 결과, {} 패턴이 관찰되었으며, 변화량은 {:.2}로 나타났습니다. \
             이는 향후 예측 및 전략 수립에 중요한 참고자료가 될 것입니다.",
            trend.label(),
            change.abs()
        ),
        InsightPayload::Distribution { .. } | InsightPayload::Histogram { .. } => {
            "데이터 분포 분석을 통해 주요 항목들의 비중과 패턴을 파악할 수 있었습니다.".to_string()
        }
    }
}
