//! Robot configuration
//!
//! Every value here is fixed for the RobotSpareBin intranet; the binary only
//! overrides paths and browser knobs.

use std::path::PathBuf;
use std::time::Duration;

use crate::playwright::PlaywrightConfig;

/// Top-level robot configuration
#[derive(Debug, Clone, Default)]
pub struct RobotConfig {
    /// Remote endpoints
    pub site: SiteConfig,

    /// Local artifact paths
    pub files: FileConfig,

    /// Element selectors on the intranet pages
    pub selectors: Selectors,

    /// Browser driver configuration
    pub browser: PlaywrightConfig,
}

/// Remote endpoints
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Intranet landing page with the login form
    pub intranet_url: String,

    /// Sales spreadsheet download
    pub sales_data_url: String,

    /// Interaction delay applied to every browser action
    pub slow_mo: Duration,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            intranet_url: "https://robotsparebinindustries.com/".to_string(),
            sales_data_url: "https://robotsparebinindustries.com/SalesData.xlsx".to_string(),
            slow_mo: Duration::from_millis(100),
        }
    }
}

/// Artifact locations, all rooted under `output_dir`
#[derive(Debug, Clone)]
pub struct FileConfig {
    pub output_dir: PathBuf,
    pub workbook_name: String,
    pub sheet_name: String,
    pub screenshot_name: String,
    pub document_name: String,
}

impl FileConfig {
    pub fn workbook_path(&self) -> PathBuf {
        self.output_dir.join(&self.workbook_name)
    }

    pub fn screenshot_path(&self) -> PathBuf {
        self.output_dir.join(&self.screenshot_name)
    }

    pub fn document_path(&self) -> PathBuf {
        self.output_dir.join(&self.document_name)
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            workbook_name: "SalesData.xlsx".to_string(),
            sheet_name: "data".to_string(),
            screenshot_name: "sales_summary.png".to_string(),
            document_name: "sales_results.pdf".to_string(),
        }
    }
}

/// Playwright selectors for the login form, the sales form and the results panel
#[derive(Debug, Clone)]
pub struct Selectors {
    pub username: String,
    pub password: String,
    pub login_button: String,
    pub first_name: String,
    pub last_name: String,
    pub sales_target: String,
    pub sales_result: String,
    pub submit: String,
    pub sales_results: String,
    pub logout: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            username: "#username".to_string(),
            password: "#password".to_string(),
            login_button: "button:text('Log in')".to_string(),
            first_name: "#firstname".to_string(),
            last_name: "#lastname".to_string(),
            sales_target: "#salestarget".to_string(),
            sales_result: "#salesresult".to_string(),
            submit: "text=Submit".to_string(),
            sales_results: "#sales-results".to_string(),
            logout: "text=Log out".to_string(),
        }
    }
}
