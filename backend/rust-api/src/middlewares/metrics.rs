use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::models::Stage;

/// Middleware collecting HTTP metrics (latency, request count)
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    // Execute the request
    let response = next.run(req).await;

    // Record metrics
    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Normalize URL path to avoid label-cardinality explosion. Every route here
/// is built from a fixed vocabulary plus a stage segment, so any segment
/// outside that vocabulary (scanner noise, invalid stages) collapses to a
/// placeholder.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            if is_known_segment(segment) {
                segment
            } else {
                "{param}"
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_known_segment(segment: &str) -> bool {
    matches!(
        segment,
        "" | "api"
            | "v1"
            | "quiz"
            | "questions"
            | "answers"
            | "progress"
            | "badge"
            | "claim"
            | "health"
            | "metrics"
    ) || Stage::ALL.iter().any(|stage| stage.as_str() == segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_routes_are_untouched() {
        assert_eq!(
            normalize_path("/api/v1/quiz/prenatal/questions"),
            "/api/v1/quiz/prenatal/questions"
        );
        assert_eq!(
            normalize_path("/api/v1/quiz/postnatal/badge/claim"),
            "/api/v1/quiz/postnatal/badge/claim"
        );
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/metrics"), "/metrics");
    }

    #[test]
    fn test_unknown_segments_collapse() {
        assert_eq!(
            normalize_path("/api/v1/quiz/garbage/questions"),
            "/api/v1/quiz/{param}/questions"
        );
        assert_eq!(
            normalize_path("/wp-admin/setup.php"),
            "/{param}/{param}"
        );
    }

    #[test]
    fn test_every_stage_is_a_known_segment() {
        for stage in Stage::ALL {
            assert!(is_known_segment(stage.as_str()));
        }
        assert!(!is_known_segment("antenatal"));
    }
}
