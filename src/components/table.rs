//! Table component
//!
//! Rows are read per row group and cells are keyed by their
//! `data-column-id` attribute. Header and body cells are fetched separately
//! and joined by column id, so reordered columns still line up. Addressing a
//! cell by position is available but breaks when columns are reordered.

use std::collections::BTreeMap;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use super::pager::{Pager, PAGER_CLASS};
use crate::component::{Clickable, Component, ElementHandle, TextReadable, Widget};
use crate::driver::By;
use crate::{Error, Result};

const HEADER_CELL_CLASS: &str = "ia_table__head__header__cell";
const BODY_CLASS: &str = "ia_table__body";
const ROW_GROUP_CLASS: &str = "ia_table__body__rowGroup";
const CELL_CLASS: &str = "ia_table__cell";
const CELL_CONTENT_CLASS: &str = "content";
const FILTER_CONTAINER_CLASS: &str = "ia_tableComponent__filterContainer";
const INPUT_FIELD_CLASS: &str = "ia_inputField";
const COLUMN_ID_ATTR: &str = "data-column-id";

/// Snapshot of one cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    /// `data-column-id` of the cell, when the table sets one
    pub column_id: Option<String>,
    pub value: String,
}

impl TableCell {
    async fn read(cell: &ElementHandle) -> Result<Self> {
        let column_id = cell.attribute(COLUMN_ID_ATTR).await?;
        let value = match cell.find(&By::class_name(CELL_CONTENT_CLASS)).await? {
            Some(content) => content.text().await?,
            None => cell.text().await?,
        };
        Ok(Self { column_id, value })
    }
}

/// Snapshot of one row, detached from the page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }

    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }

    /// Value of the cell in column `column_id`
    pub fn get(&self, column_id: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|cell| cell.column_id.as_deref() == Some(column_id))
            .map(|cell| cell.value.as_str())
    }

    /// Value of the cell at 1-based position `index` in render order
    pub fn get_by_index(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(1)
            .and_then(|i| self.cells.get(i))
            .map(|cell| cell.value.as_str())
    }

    /// Column id to value, skipping cells without an id
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.cells
            .iter()
            .filter_map(|cell| Some((cell.column_id.clone()?, cell.value.clone())))
            .collect()
    }
}

/// One row group of a rendered table
#[derive(Debug, Clone)]
pub struct TableRowGroup {
    component: Component,
}

impl Widget for TableRowGroup {
    fn from_component(component: Component) -> Self {
        Self { component }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Clickable for TableRowGroup {}
impl TextReadable for TableRowGroup {}

impl TableRowGroup {
    pub async fn column_id(&self) -> Result<Option<String>> {
        self.component.attribute(COLUMN_ID_ATTR).await
    }

    /// Read every cell of the row
    pub async fn read(&self) -> Result<TableRow> {
        let mut cells = Vec::new();
        for cell in self.component.find_all(&By::class_name(CELL_CLASS)).await? {
            cells.push(TableCell::read(&cell).await?);
        }
        Ok(TableRow::new(cells))
    }
}

/// Perspective table
#[derive(Debug, Clone)]
pub struct Table {
    component: Component,
    pager: OnceCell<Pager>,
}

impl Widget for Table {
    fn from_component(component: Component) -> Self {
        Self {
            component,
            pager: OnceCell::new(),
        }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Table {
    /// Column ids of the header cells, in render order
    pub async fn headers(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for cell in self
            .component
            .wait_for_elements(&By::class_name(HEADER_CELL_CLASS))
            .await?
        {
            if let Some(id) = cell.attribute(COLUMN_ID_ATTR).await? {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    /// Header label of the column `column_id`
    pub async fn header_label(&self, column_id: &str) -> Result<String> {
        for cell in self
            .component
            .wait_for_elements(&By::class_name(HEADER_CELL_CLASS))
            .await?
        {
            if cell.attribute(COLUMN_ID_ATTR).await?.as_deref() == Some(column_id) {
                return Ok(TableCell::read(&cell).await?.value);
            }
        }
        Err(Error::element_not_found(format!("header cell for column {}", column_id)))
    }

    /// Row groups rendered on the current page
    ///
    /// Waits for the table body only, so a table without rows yields an
    /// empty list.
    pub async fn row_groups(&self) -> Result<Vec<TableRowGroup>> {
        let session = self.component.session();
        let body = self
            .component
            .wait_for_element(&By::class_name(BODY_CLASS))
            .await?;
        Ok(body
            .find_all(&By::class_name(ROW_GROUP_CLASS))
            .await?
            .into_iter()
            .map(|handle| TableRowGroup::from_element(session, handle))
            .collect())
    }

    /// Rows on the current page
    pub async fn rows(&self) -> Result<Vec<TableRow>> {
        let mut rows = Vec::new();
        for group in self.row_groups().await? {
            rows.push(group.read().await?);
        }
        Ok(rows)
    }

    /// Rows on the current page as column id to value maps
    pub async fn data(&self) -> Result<Vec<BTreeMap<String, String>>> {
        Ok(self.rows().await?.iter().map(TableRow::to_map).collect())
    }

    /// Values of one column on the current page, joined through the header ids
    pub async fn column(&self, column_id: &str) -> Result<Vec<String>> {
        if !self.headers().await?.iter().any(|id| id == column_id) {
            return Err(Error::element_not_found(format!("column {}", column_id)));
        }
        Ok(self
            .rows()
            .await?
            .iter()
            .map(|row| row.get(column_id).unwrap_or_default().to_string())
            .collect())
    }

    /// Value of column `column_id` in row `row_index` (0-based)
    pub async fn cell(&self, row_index: usize, column_id: &str) -> Result<String> {
        let group = self.row_group(row_index).await?;
        group
            .read()
            .await?
            .get(column_id)
            .map(str::to_string)
            .ok_or_else(|| {
                Error::element_not_found(format!("cell {} in row {}", column_id, row_index))
            })
    }

    /// Click row `row_index` (0-based)
    #[instrument(skip(self))]
    pub async fn click_on_row(&self, row_index: usize) -> Result<()> {
        self.row_group(row_index).await?.click().await
    }

    /// Double-click row `row_index` (0-based)
    #[instrument(skip(self))]
    pub async fn double_click_on_row(&self, row_index: usize) -> Result<()> {
        self.row_group(row_index).await?.double_click().await
    }

    /// Type into the table's filter field
    #[instrument(skip(self))]
    pub async fn filter_table(&self, keys: &str) -> Result<()> {
        let container = self.component.find_by_class_name(FILTER_CONTAINER_CLASS).await?;
        let input = container.find_by_class_name(INPUT_FIELD_CLASS).await?;
        input.click().await?;
        input.send_keys(keys).await
    }

    pub async fn has_pager(&self) -> Result<bool> {
        self.component.has_element(&By::class_name(PAGER_CLASS)).await
    }

    /// Pager of this table; its layout is detected once and kept
    pub async fn pager(&self) -> Result<&Pager> {
        self.pager
            .get_or_try_init(|| async {
                let table = self.component.resolve().await?;
                let pager = Pager::locate_within(
                    self.component.session(),
                    By::class_name(PAGER_CLASS),
                    table,
                );
                pager.component().resolve().await?;
                Ok::<_, Error>(pager)
            })
            .await
    }

    /// Rows of every page, in page order
    ///
    /// Starts from page 1 and advances until the pager stops moving, then
    /// returns to the page that was showing before the call.
    #[instrument(skip(self))]
    pub async fn all_rows(&self) -> Result<Vec<TableRow>> {
        if !self.has_pager().await? {
            return self.rows().await;
        }

        let pager = self.pager().await?;
        let original = pager.current_page().await?;
        let mut page = pager.first_page().await?;

        let mut rows = Vec::new();
        loop {
            let page_rows = self.rows().await?;
            debug!("Read {} row(s) from page {}", page_rows.len(), page);
            rows.extend(page_rows);

            let next = pager.next_page().await?;
            if next == page {
                break;
            }
            page = next;
        }

        if page != original {
            pager.jump_to_page(original).await?;
        }
        info!("Read {} row(s) across {} page(s)", rows.len(), page);
        Ok(rows)
    }

    async fn row_group(&self, row_index: usize) -> Result<TableRowGroup> {
        let mut groups = self.row_groups().await?;
        if row_index >= groups.len() {
            return Err(Error::component_interaction(format!(
                "Click index {} out of range: {}",
                row_index,
                groups.len()
            )));
        }
        Ok(groups.swap_remove(row_index))
    }
}
