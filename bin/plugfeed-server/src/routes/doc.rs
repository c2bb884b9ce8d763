use crate::routes::{catalog, descriptor, health, report};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "plugfeed-server",
    description = "IDE plugin update feeds mirrored from GitHub releases",
    version = "0.1.0",
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(catalog::CatalogApi::openapi());
    root.merge(descriptor::DescriptorApi::openapi());
    root.merge(report::ReportApi::openapi());
    root
}
