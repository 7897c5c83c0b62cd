use crate::infra::AppState;
use axum::extract::{DefaultBodyLimit, Multipart, Query};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Local;
use cpi_report::error::AppError;
use cpi_report::insights::analyze;
use cpi_report::render::docx::DOCX_MIME;
use cpi_report::render::export::XLSX_MIME;
use cpi_report::render::{
    consumer_press_release_html, index_table_xlsx, insight_press_release, pdf_to_docx,
    press_release_docx, ConvertError,
};
use cpi_report::sources::{parse_upload, DataSource, PeriodQuery, UploadError};
use cpi_report::statistics::{compute_statistics, StatisticsPreset};
use cpi_report::table::IndexTable;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::info;

const PREVIEW_ROWS: usize = 10;

/// Dashboard period selection; malformed month counts are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PeriodParams {
    pub(crate) period_type: Option<String>,
    pub(crate) month_count: Option<String>,
    pub(crate) start_date: Option<String>,
    pub(crate) end_date: Option<String>,
}

impl PeriodParams {
    fn query(&self) -> Result<PeriodQuery, AppError> {
        let month_count = self
            .month_count
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok());
        Ok(PeriodQuery::from_params(
            self.period_type.as_deref(),
            month_count,
            self.start_date.as_deref(),
            self.end_date.as_deref(),
        )?)
    }
}

pub(crate) fn router(state: AppState) -> Router {
    let upload_limit = state.upload_limit;
    Router::new()
        .route("/health", get(healthcheck))
        .route("/api/health", get(api_healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/statistics", get(statistics_endpoint))
        .route("/api/press-release", get(press_release_endpoint))
        .route("/api/consumer/statistics", get(consumer_statistics_endpoint))
        .route("/api/consumer/press-release", get(consumer_press_release_endpoint))
        .route("/api/consumer/download-data", get(download_data_endpoint))
        .route(
            "/api/upload",
            post(upload_endpoint).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/api/pdf-to-docx",
            post(pdf_to_docx_endpoint).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn api_healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn workbook_table(state: &AppState) -> Result<IndexTable, AppError> {
    Ok(state
        .sources
        .workbook
        .load(&PeriodQuery::default())
        .await?)
}

async fn consumer_table(state: &AppState, params: &PeriodParams) -> Result<IndexTable, AppError> {
    let query = params.query()?;
    Ok(state.sources.consumer.load(&query).await?)
}

fn attachment(mime: &'static str, file_name: String, body: Vec<u8>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        body,
    )
}

/// Non-ASCII names go in `filename*` (RFC 6266) with an ASCII fallback.
fn content_disposition(file_name: &str) -> String {
    if file_name.is_ascii() {
        return format!("attachment; filename=\"{file_name}\"");
    }
    let fallback = match file_name.rsplit_once('.') {
        Some((_, extension)) if extension.is_ascii() => format!("download.{extension}"),
        _ => "download".to_string(),
    };
    let mut encoded = String::with_capacity(file_name.len() * 3);
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(char::from(byte));
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

pub(crate) async fn statistics_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let table = workbook_table(&state).await?;
    let statistics = compute_statistics(&table, StatisticsPreset::PressRelease)?;
    Ok(Json(json!({ "success": true, "statistics": statistics })))
}

pub(crate) async fn press_release_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let table = workbook_table(&state).await?;
    let statistics = compute_statistics(&table, StatisticsPreset::PressRelease)?;
    let today = Local::now().date_naive();
    let document = press_release_docx(&statistics, today)?;
    info!(bytes = document.len(), "rendered press release document");

    let file_name = format!("cpi_press_release_{}.docx", today.format("%Y%m%d"));
    Ok(attachment(DOCX_MIME, file_name, document))
}

pub(crate) async fn consumer_statistics_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let table = consumer_table(&state, &params).await?;
    let statistics = compute_statistics(&table, StatisticsPreset::Interesting)?;
    Ok(Json(json!({ "success": true, "statistics": statistics })))
}

pub(crate) async fn consumer_press_release_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<PeriodParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let table = consumer_table(&state, &params).await?;
    let statistics = compute_statistics(&table, StatisticsPreset::Interesting)?;
    let html = consumer_press_release_html(&statistics, Local::now().naive_local());
    Ok(Json(json!({ "success": true, "html": html })))
}

pub(crate) async fn download_data_endpoint(
    Extension(state): Extension<AppState>,
    Query(params): Query<PeriodParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.query()?;
    let table = state.sources.consumer.load(&query).await?;
    let workbook = index_table_xlsx(&table)?;
    info!(rows = table.rows().len(), bytes = workbook.len(), "exported consumer data");

    let file_name = format!(
        "cpi_{}_{}.xlsx",
        Local::now().format("%Y%m%d"),
        query.file_tag()
    );
    Ok(attachment(XLSX_MIME, file_name, workbook))
}

pub(crate) async fn upload_endpoint(
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, AppError> {
    let malformed = |err: axum::extract::multipart::MultipartError| {
        UploadError::Malformed(err.body_text())
    };

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(malformed)?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) = upload.ok_or(UploadError::MissingFile)?;

    let table = parse_upload(&file_name, &bytes)?;
    let insights = analyze(&table);
    let press_release = insight_press_release(&insights, Local::now().naive_local());

    Ok(Json(json!({
        "success": true,
        "insights": insights,
        "press_release": press_release,
        "data_preview": table.preview(PREVIEW_ROWS),
    })))
}

pub(crate) async fn pdf_to_docx_endpoint(
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let malformed = |err: axum::extract::multipart::MultipartError| {
        UploadError::Malformed(err.body_text())
    };

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(malformed)?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) = upload.ok_or(ConvertError::MissingFile)?;

    let converted = tokio::task::spawn_blocking(move || pdf_to_docx(&file_name, &bytes))
        .await
        .map_err(|err| ConvertError::Io(std::io::Error::other(err)))??;
    Ok(attachment(DOCX_MIME, converted.file_name, converted.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ReportSources;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use cpi_report::sources::{
        read_bytes, FallbackSource, FileFormat, KosisSource, LocalWorkbookSource,
    };
    use cpi_report::table::RawCell;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::io::{Read, Write};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const BOUNDARY: &str = "cpi-report-boundary";

    fn dataset_csv() -> String {
        let periods: Vec<String> = (0..24)
            .map(|i| format!("{}.{:02}", 2023 + i / 12, i % 12 + 1))
            .collect();
        let total: Vec<String> = (0..24)
            .map(|i| format!("{:.1}", 100.0 + f64::from(i) * 0.5))
            .collect();
        let food: Vec<String> = (0..24)
            .map(|i| format!("{:.1}", 100.0 + f64::from(i)))
            .collect();
        format!(
            "시도별,지출목적별,{}\n전국,0 총지수,{}\n전국,01 식료품,{}\n",
            periods.join(","),
            total.join(","),
            food.join(",")
        )
    }

    fn dataset_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("temp dataset");
        file.write_all(dataset_csv().as_bytes())
            .expect("write dataset");
        file
    }

    fn state_with(workbook: LocalWorkbookSource, kosis: KosisSource) -> AppState {
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            sources: Arc::new(ReportSources {
                consumer: FallbackSource::new(kosis, workbook.clone()),
                workbook,
            }),
            upload_limit: 1024 * 1024,
        }
    }

    fn kosis(url: &str, api_key: Option<&str>) -> KosisSource {
        KosisSource::new(
            url,
            api_key.map(str::to_string),
            Duration::from_secs(5),
            "0 총지수",
        )
        .expect("kosis client")
    }

    fn local_state(file: &tempfile::NamedTempFile) -> AppState {
        state_with(
            LocalWorkbookSource::new(file.path()).with_sheet(None),
            kosis("http://127.0.0.1:9/unused", None),
        )
    }

    async fn fake_kosis(payload: Value) -> String {
        let app = Router::new().route(
            "/statisticsParameterData.do",
            get(move || {
                let payload = payload.clone();
                async move { Json(payload) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake kosis");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake kosis serves");
        });
        format!("http://{addr}/statisticsParameterData.do")
    }

    fn kosis_rows() -> Value {
        let rows: Vec<Value> = (0..24)
            .map(|i| {
                json!({
                    "C1_NM": "전국",
                    "C2_NM": "0 총지수",
                    "PRD_DE": format!("{}{:02}", 2023 + i / 12, i % 12 + 1),
                    "DT": format!("{:.1}", 110.0 + f64::from(i)),
                })
            })
            .collect();
        Value::Array(rows)
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = router(state).oneshot(request).await.expect("response");
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        (status, headers, body.to_vec())
    }

    async fn get_json(state: AppState, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let (status, _, body) = send(state, request).await;
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    fn multipart_request(file_name: &str, contents: &[u8]) -> Request<Body> {
        multipart_to("/api/upload", file_name, contents)
    }

    fn multipart_to(uri: &str, file_name: &str, contents: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request")
    }

    /// Single-page PDF drawing `content` with Helvetica; xref offsets are
    /// computed so the file parses without repair.
    fn pdf_document(content: &str) -> Vec<u8> {
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];
        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (idx, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", idx + 1).as_bytes());
        }
        let xref = pdf.len();
        pdf.extend_from_slice(
            format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes(),
        );
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    #[tokio::test]
    async fn health_endpoints_report_status() {
        let file = dataset_file();
        let (status, body) = get_json(local_state(&file), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));

        let (_, body) = get_json(local_state(&file), "/api/health").await;
        assert_eq!(body, json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn readiness_reflects_flag() {
        let file = dataset_file();
        let state = local_state(&file);
        state.readiness.store(false, Ordering::Release);
        let (status, body) = get_json(state.clone(), "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        state.readiness.store(true, Ordering::Release);
        let (status, _) = get_json(state, "/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn statistics_come_from_bundled_workbook() {
        let file = dataset_file();
        let (status, body) = get_json(local_state(&file), "/api/statistics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["statistics"]["max_index"]["value"], 111.5);
        assert_eq!(body["statistics"]["max_index"]["date"], "2024.12");
        let keys: Vec<&String> = body["statistics"]
            .as_object()
            .expect("statistics object")
            .keys()
            .collect();
        assert_eq!(keys.first().map(|key| key.as_str()), Some("overall_mean"));
    }

    #[tokio::test]
    async fn missing_workbook_is_a_gateway_error() {
        let state = state_with(
            LocalWorkbookSource::new("/nonexistent/cpi.xlsx"),
            kosis("http://127.0.0.1:9/unused", None),
        );
        let (status, body) = get_json(state, "/api/statistics").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().expect("message").contains("cpi.xlsx"));
    }

    #[tokio::test]
    async fn press_release_downloads_docx() {
        let file = dataset_file();
        let request = Request::builder()
            .uri("/api/press-release")
            .body(Body::empty())
            .expect("request");
        let (status, headers, body) = send(local_state(&file), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], DOCX_MIME);
        let disposition = headers[header::CONTENT_DISPOSITION]
            .to_str()
            .expect("ascii header");
        assert!(disposition.starts_with("attachment; filename=\"cpi_press_release_"));
        assert!(body.starts_with(b"PK"));
    }

    #[tokio::test]
    async fn consumer_statistics_require_api_key() {
        let file = dataset_file();
        let (status, body) = get_json(local_state(&file), "/api/consumer/statistics").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"]
            .as_str()
            .expect("message")
            .contains("KOSIS_API_KEY"));
    }

    #[tokio::test]
    async fn consumer_statistics_use_kosis_payload() {
        let file = dataset_file();
        let url = fake_kosis(kosis_rows()).await;
        let state = state_with(
            LocalWorkbookSource::new(file.path()).with_sheet(None),
            kosis(&url, Some("test-key")),
        );

        let (status, body) =
            get_json(state, "/api/consumer/statistics?periodType=months&monthCount=24").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statistics"]["linear_trend_slope"]["value"], 1.0);
    }

    #[tokio::test]
    async fn untransformable_payload_falls_back_to_workbook() {
        let file = dataset_file();
        let url = fake_kosis(json!([{ "C1_NM": "전국", "C2_NM": "0 총지수" }])).await;
        let state = state_with(
            LocalWorkbookSource::new(file.path()).with_sheet(None),
            kosis(&url, Some("test-key")),
        );

        let (status, body) = get_json(state, "/api/consumer/statistics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["statistics"]["linear_trend_slope"]["value"], 0.5);
    }

    #[tokio::test]
    async fn api_error_codes_are_not_masked() {
        let file = dataset_file();
        let url = fake_kosis(json!({ "err": "20", "errMsg": "인증키 오류" })).await;
        let state = state_with(
            LocalWorkbookSource::new(file.path()).with_sheet(None),
            kosis(&url, Some("test-key")),
        );

        let (status, body) = get_json(state, "/api/consumer/press-release").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().expect("message").contains("인증키 오류"));
    }

    #[tokio::test]
    async fn consumer_press_release_returns_html() {
        let file = dataset_file();
        let url = fake_kosis(kosis_rows()).await;
        let state = state_with(
            LocalWorkbookSource::new(file.path()).with_sheet(None),
            kosis(&url, Some("test-key")),
        );

        let (status, body) = get_json(state, "/api/consumer/press-release").await;
        assert_eq!(status, StatusCode::OK);
        let html = body["html"].as_str().expect("html");
        assert!(html.contains("소비자물가동향"));
        assert!(html.contains("물가 상승 추세"));
    }

    #[tokio::test]
    async fn inverted_range_is_a_bad_request() {
        let file = dataset_file();
        let (status, body) = get_json(
            local_state(&file),
            "/api/consumer/statistics?periodType=range&startDate=2024-05&endDate=2024-01",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn download_data_exports_workbook() {
        let file = dataset_file();
        let url = fake_kosis(kosis_rows()).await;
        let state = state_with(
            LocalWorkbookSource::new(file.path()).with_sheet(None),
            kosis(&url, Some("test-key")),
        );
        let request = Request::builder()
            .uri("/api/consumer/download-data?periodType=range&startDate=2023-01&endDate=2024-12")
            .body(Body::empty())
            .expect("request");

        let (status, headers, body) = send(state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], XLSX_MIME);
        let disposition = headers[header::CONTENT_DISPOSITION]
            .to_str()
            .expect("ascii header");
        assert!(disposition.starts_with("attachment; filename=\"cpi_"));
        assert!(disposition.ends_with("_202301-202412.xlsx\""));

        let sheet = read_bytes(FileFormat::Xlsx, &body, Some("데이터")).expect("workbook sheet");
        assert_eq!(sheet.headers()[..4], ["시도별", "지출목적별", "2023.01", "2023.02"]);
        assert_eq!(sheet.headers().len(), 26);
        assert_eq!(sheet.rows()[0][0], RawCell::Text("전국".to_string()));
        assert_eq!(sheet.rows()[0][1], RawCell::Text("0 총지수".to_string()));
        assert_eq!(sheet.rows()[0][2], RawCell::Number(110.0));
        assert_eq!(sheet.rows()[0][25], RawCell::Number(133.0));
    }

    #[tokio::test]
    async fn pdf_conversion_rejects_other_files() {
        let file = dataset_file();
        let request = multipart_to("/api/pdf-to-docx", "notes.txt", b"hello");
        let (status, _, body) = send(local_state(&file), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(
            body,
            json!({ "success": false, "error": "PDF 파일만 업로드 가능합니다." })
        );
    }

    #[tokio::test]
    async fn pdf_without_text_layer_is_unprocessable() {
        let file = dataset_file();
        let request = multipart_to("/api/pdf-to-docx", "scan.pdf", &pdf_document(""));
        let (status, _, body) = send(local_state(&file), request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "PDF에서 텍스트를 추출할 수 없습니다. 이미지 기반 PDF일 수 있습니다."
        );
    }

    #[tokio::test]
    async fn pdf_text_is_converted_to_docx() {
        let file = dataset_file();
        let pdf = pdf_document("BT /F1 24 Tf 72 720 Td (Consumer prices rose) Tj ET");
        let request = multipart_to("/api/pdf-to-docx", "march.pdf", &pdf);
        let (status, headers, body) = send(local_state(&file), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], DOCX_MIME);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"march.docx\""
        );

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(body)).expect("docx archive");
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .expect("document part")
            .read_to_string(&mut document)
            .expect("utf-8 document");
        assert!(document.contains("Consumer"));
        assert!(document.contains("rose"));
    }

    #[test]
    fn non_ascii_names_use_extended_disposition() {
        assert_eq!(
            content_disposition("cpi.xlsx"),
            "attachment; filename=\"cpi.xlsx\""
        );
        assert_eq!(
            content_disposition("보도.docx"),
            "attachment; filename=\"download.docx\"; filename*=UTF-8''%EB%B3%B4%EB%8F%84.docx"
        );
    }

    #[tokio::test]
    async fn upload_returns_insights_and_press_release() {
        let file = dataset_file();
        let request = multipart_request("sales.csv", b"region,sales\nnorth,12\nsouth,7.5\n");
        let (status, _, body) = send(local_state(&file), request).await;
        assert_eq!(status, StatusCode::OK);

        let body: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["success"], true);
        let insights = body["insights"].as_array().expect("insights");
        assert_eq!(insights[0]["type"], "summary");
        assert_eq!(insights[0]["data"]["rows"], 2);
        assert!(body["press_release"]
            .as_str()
            .expect("press release")
            .contains("[보도자료]"));
        assert_eq!(body["data_preview"][1]["region"], "south");
    }

    #[tokio::test]
    async fn upload_rejects_unsupported_files() {
        let file = dataset_file();
        let request = multipart_request("notes.txt", b"hello");
        let (status, _, body) = send(local_state(&file), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(
            body["error"],
            "엑셀 파일(.xlsx, .xls) 또는 CSV 파일만 업로드 가능합니다."
        );
    }

    #[tokio::test]
    async fn upload_without_file_field_is_rejected() {
        let file = dataset_file();
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request");

        let (status, _, body) = send(local_state(&file), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(body["error"], "파일이 없습니다.");
    }
}
