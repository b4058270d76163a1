//! Sales form replay

use tracing::{error, info};

use crate::config::RobotConfig;
use crate::error::RobotResult;
use crate::session::PageSession;
use crate::sheet::{SalesRow, SpreadsheetReader};

/// Fill in the sales form for one row and submit it.
pub async fn fill_and_submit_sales_form(
    session: &mut dyn PageSession,
    config: &RobotConfig,
    row: &SalesRow,
) -> RobotResult<()> {
    let s = &config.selectors;
    session.fill(&s.first_name, &row.first_name).await?;
    session.fill(&s.last_name, &row.last_name).await?;
    session.select_option(&s.sales_target, &row.sales_target).await?;
    session.fill(&s.sales_result, &row.sales).await?;
    session.click(&s.submit).await?;
    Ok(())
}

/// Read the downloaded workbook and submit every row in file order.
///
/// Stops at the first failure; rows after it are never touched. `submitted`
/// counts completed submissions, including those before a failure.
pub async fn fill_form(
    session: &mut dyn PageSession,
    reader: &dyn SpreadsheetReader,
    config: &RobotConfig,
    submitted: &mut usize,
) -> RobotResult<()> {
    let result = submit_rows(session, reader, config, submitted).await;
    if let Err(e) = &result {
        error!("Error while filling form: {}", e);
    }
    result
}

async fn submit_rows(
    session: &mut dyn PageSession,
    reader: &dyn SpreadsheetReader,
    config: &RobotConfig,
    submitted: &mut usize,
) -> RobotResult<()> {
    let table = reader.read_table(&config.files.workbook_path(), &config.files.sheet_name)?;

    for (index, row) in table.into_sales_rows().enumerate() {
        let row = row?;
        info!("Processing item {}: {:?}", index + 1, row);
        fill_and_submit_sales_form(session, config, &row).await?;
        *submitted += 1;
    }

    Ok(())
}
