//! Table pager
//!
//! Perspective renders two pager layouts. A SIMPLE pager shows every page
//! number as a button and nothing else. A ROBUST pager adds next, previous,
//! first and last controls (each disabled at its boundary), a jump-to-page
//! field and a page-size selector, and only renders a window of page buttons.
//! The layout is detected once per [`Pager`] by probing for the next control.
//!
//! Moving past a boundary with [`Pager::next_page`] or [`Pager::prev_page`] is
//! a quiet no-op that returns the unchanged page number. The `_strict`
//! variants fail with [`Error::ComponentInteraction`] instead.

use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::component::{Component, ElementHandle, Widget};
use crate::driver::{By, Key};
use crate::{Error, Result};

pub(crate) const PAGER_CLASS: &str = "ia_pager";
const PAGE_CLASS: &str = "ia_pager__page";
const ACTIVE_PAGE_CLASS: &str = "ia_pager__page--active";
const NEXT_CLASS: &str = "ia_pager__next";
const PREV_CLASS: &str = "ia_pager__prev";
const FIRST_CLASS: &str = "ia_pager__first";
const LAST_CLASS: &str = "ia_pager__last";
const JUMP_CLASS: &str = "ia_pager__jump";
const PAGE_SIZE_CLASS: &str = "ia_pager__pageSize";

/// Pager layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerVariant {
    /// Only numbered page buttons
    Simple,
    /// Navigation controls, jump field and a partial set of page buttons
    Robust,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Back,
}

/// Pager of one table
#[derive(Debug, Clone)]
pub struct Pager {
    component: Component,
    variant: OnceCell<PagerVariant>,
}

impl Widget for Pager {
    fn from_component(component: Component) -> Self {
        Self {
            component,
            variant: OnceCell::new(),
        }
    }

    fn component(&self) -> &Component {
        &self.component
    }
}

impl Pager {
    /// Pager layout, probed on first use
    pub async fn variant(&self) -> Result<PagerVariant> {
        self.variant
            .get_or_try_init(|| async {
                let variant = if self.component.has_element(&By::class_name(NEXT_CLASS)).await? {
                    PagerVariant::Robust
                } else {
                    PagerVariant::Simple
                };
                debug!("Detected {:?} pager", variant);
                Ok::<_, Error>(variant)
            })
            .await
            .copied()
    }

    /// Number on the active page button
    pub async fn current_page(&self) -> Result<u32> {
        let active = self
            .component
            .wait_for_element(&By::class_name(ACTIVE_PAGE_CLASS))
            .await?;
        parse_page(&active.text().await?)
    }

    pub async fn is_first_page(&self) -> Result<bool> {
        self.at_boundary(Direction::Back).await
    }

    pub async fn is_last_page(&self) -> Result<bool> {
        self.at_boundary(Direction::Forward).await
    }

    /// Advance one page; returns the page shown afterwards
    #[instrument(skip(self))]
    pub async fn next_page(&self) -> Result<u32> {
        self.step(Direction::Forward).await
    }

    /// Go back one page; returns the page shown afterwards
    #[instrument(skip(self))]
    pub async fn prev_page(&self) -> Result<u32> {
        self.step(Direction::Back).await
    }

    /// Like [`Pager::next_page`], but fails on the last page
    pub async fn next_page_strict(&self) -> Result<u32> {
        if self.is_last_page().await? {
            return Err(Error::component_interaction("Already on the last page"));
        }
        self.next_page().await
    }

    /// Like [`Pager::prev_page`], but fails on the first page
    pub async fn prev_page_strict(&self) -> Result<u32> {
        if self.is_first_page().await? {
            return Err(Error::component_interaction("Already on the first page"));
        }
        self.prev_page().await
    }

    #[instrument(skip(self))]
    pub async fn first_page(&self) -> Result<u32> {
        self.go_to_end(Direction::Back).await
    }

    #[instrument(skip(self))]
    pub async fn last_page(&self) -> Result<u32> {
        self.go_to_end(Direction::Forward).await
    }

    /// Show page `page` (1-based)
    ///
    /// Fails with [`Error::ComponentInteraction`] when the pager does not end
    /// up on the requested page.
    #[instrument(skip(self))]
    pub async fn jump_to_page(&self, page: u32) -> Result<u32> {
        if page == 0 {
            return Err(out_of_range(page, None));
        }
        let before = self.current_page().await?;
        if before == page {
            return Ok(page);
        }

        if let Some(field) = self.component.find(&By::class_name(JUMP_CLASS)).await? {
            field.click().await?;
            field.send_keys(self.component.session().select_all_keys()).await?;
            field.send_keys(&String::from(Key::Delete)).await?;
            field.send_keys(&page.to_string()).await?;
            field.send_keys(&String::from(Key::Enter)).await?;
            return self.verify_page(page).await;
        }

        match self.variant().await? {
            PagerVariant::Robust => {
                let mut current = before;
                while current != page {
                    let direction = if page > current {
                        Direction::Forward
                    } else {
                        Direction::Back
                    };
                    let next = self.step(direction).await?;
                    if next == current {
                        return Err(out_of_range(page, Some(current)));
                    }
                    current = next;
                }
                Ok(current)
            }
            PagerVariant::Simple => {
                let mut target = None;
                for button in self.page_buttons().await? {
                    if parse_page(&button.text().await?).ok() == Some(page) {
                        target = Some(button);
                        break;
                    }
                }
                let button = target.ok_or_else(|| out_of_range(page, Some(before)))?;
                button.click().await?;
                self.verify_page(page).await
            }
        }
    }

    /// Total number of pages
    ///
    /// A ROBUST pager only renders some page buttons, so the count is read
    /// from the last page and the pager is returned to the page it was on.
    #[instrument(skip(self))]
    pub async fn page_count(&self) -> Result<u32> {
        match self.variant().await? {
            PagerVariant::Simple => Ok(self.page_buttons().await?.len() as u32),
            PagerVariant::Robust => {
                let before = self.current_page().await?;
                let last = self.last_page().await?;
                if last != before {
                    self.jump_to_page(before).await?;
                }
                Ok(last)
            }
        }
    }

    /// Rows per page from the page-size selector
    pub async fn page_size(&self) -> Result<u32> {
        let select = self.page_size_select().await?;
        let value = match select.attribute("value").await? {
            Some(value) => value,
            None => select.text().await?,
        };
        value
            .trim()
            .parse()
            .map_err(|_| Error::parse(format!("Page size is not a number: {:?}", value)))
    }

    /// Pick one of the offered page sizes
    #[instrument(skip(self))]
    pub async fn set_page_size(&self, size: u32) -> Result<()> {
        let select = self.page_size_select().await?;
        let offered = select.options().await?;
        let wanted = size.to_string();
        if !offered.contains(&wanted) || !select.select_by_visible_text(&wanted).await? {
            return Err(Error::component_interaction(format!(
                "No page size option {} (offered: {})",
                size,
                offered.join(", ")
            )));
        }
        Ok(())
    }

    async fn page_size_select(&self) -> Result<ElementHandle> {
        self.component
            .find(&By::class_name(PAGE_SIZE_CLASS))
            .await?
            .ok_or_else(|| Error::element_not_found(format!("page size selector ({})", PAGE_SIZE_CLASS)))
    }

    async fn page_buttons(&self) -> Result<Vec<ElementHandle>> {
        self.component
            .wait_for_elements(&By::class_name(PAGE_CLASS))
            .await
    }

    /// Rendered page buttons and the position of the active one
    async fn active_index(&self) -> Result<(Vec<ElementHandle>, usize)> {
        let buttons = self.page_buttons().await?;
        for (index, button) in buttons.iter().enumerate() {
            if button.has_class(ACTIVE_PAGE_CLASS).await? {
                return Ok((buttons, index));
            }
        }
        Err(Error::element_not_found(format!("active page button ({})", ACTIVE_PAGE_CLASS)))
    }

    async fn control(&self, class: &str) -> Result<Option<ElementHandle>> {
        self.component.find(&By::class_name(class)).await
    }

    async fn at_boundary(&self, direction: Direction) -> Result<bool> {
        match self.variant().await? {
            PagerVariant::Robust => {
                let class = match direction {
                    Direction::Forward => NEXT_CLASS,
                    Direction::Back => PREV_CLASS,
                };
                match self.control(class).await? {
                    Some(control) => is_disabled(&control).await,
                    None => Ok(true),
                }
            }
            PagerVariant::Simple => {
                let (buttons, index) = self.active_index().await?;
                Ok(match direction {
                    Direction::Forward => index + 1 >= buttons.len(),
                    Direction::Back => index == 0,
                })
            }
        }
    }

    async fn step(&self, direction: Direction) -> Result<u32> {
        let before = self.current_page().await?;
        if self.at_boundary(direction).await? {
            debug!("Pager already at boundary on page {}", before);
            return Ok(before);
        }

        match self.variant().await? {
            PagerVariant::Robust => {
                let class = match direction {
                    Direction::Forward => NEXT_CLASS,
                    Direction::Back => PREV_CLASS,
                };
                let control = self
                    .control(class)
                    .await?
                    .ok_or_else(|| Error::element_not_found(format!("pager control ({})", class)))?;
                control.click().await?;
            }
            PagerVariant::Simple => {
                let (buttons, index) = self.active_index().await?;
                let target = match direction {
                    Direction::Forward => buttons.get(index + 1),
                    Direction::Back => index.checked_sub(1).and_then(|i| buttons.get(i)),
                };
                match target {
                    Some(button) => button.click().await?,
                    None => return Ok(before),
                }
            }
        }
        self.wait_for_page_change(before).await
    }

    async fn go_to_end(&self, direction: Direction) -> Result<u32> {
        let before = self.current_page().await?;
        if self.at_boundary(direction).await? {
            return Ok(before);
        }

        let class = match direction {
            Direction::Forward => LAST_CLASS,
            Direction::Back => FIRST_CLASS,
        };
        if let Some(control) = self.control(class).await? {
            if !is_disabled(&control).await? {
                control.click().await?;
                return self.wait_for_page_change(before).await;
            }
        }

        match self.variant().await? {
            PagerVariant::Simple => {
                let buttons = self.page_buttons().await?;
                let target = match direction {
                    Direction::Forward => buttons.last(),
                    Direction::Back => buttons.first(),
                };
                match target {
                    Some(button) => {
                        button.click().await?;
                        self.wait_for_page_change(before).await
                    }
                    None => Ok(before),
                }
            }
            PagerVariant::Robust => {
                let mut current = before;
                loop {
                    let next = self.step(direction).await?;
                    if next == current {
                        return Ok(current);
                    }
                    current = next;
                }
            }
        }
    }

    /// Active page number without waiting, `None` while none is marked active
    async fn read_page(&self) -> Result<Option<u32>> {
        match self.component.find(&By::class_name(ACTIVE_PAGE_CLASS)).await? {
            Some(active) => parse_page(&active.text().await?).map(Some),
            None => Ok(None),
        }
    }

    async fn wait_for_page_change(&self, before: u32) -> Result<u32> {
        let description = format!("pager to leave page {}", before);
        self.component
            .wait()
            .until_updated(&description, || async move {
                Ok(self.read_page().await?.filter(|page| *page != before))
            })
            .await
    }

    async fn verify_page(&self, page: u32) -> Result<u32> {
        let description = format!("pager to show page {}", page);
        let reached = self
            .component
            .wait()
            .until_updated(&description, || async move {
                Ok(self.read_page().await?.filter(|current| *current == page))
            })
            .await;

        match reached {
            Ok(current) => Ok(current),
            Err(Error::ElementNotUpdated(_)) => {
                let current = self.read_page().await?;
                Err(out_of_range(page, current))
            }
            Err(e) => Err(e),
        }
    }
}

fn out_of_range(requested: u32, current: Option<u32>) -> Error {
    match current {
        Some(current) => Error::component_interaction(format!(
            "page index out of range: requested {}, showing {}",
            requested, current
        )),
        None => Error::component_interaction(format!("page index out of range: requested {}", requested)),
    }
}

fn parse_page(label: &str) -> Result<u32> {
    label
        .trim()
        .parse()
        .map_err(|_| Error::parse(format!("Page label is not a number: {:?}", label)))
}

async fn is_disabled(control: &ElementHandle) -> Result<bool> {
    Ok(control
        .class_list()
        .await?
        .iter()
        .any(|class| class == "disabled" || class.ends_with("--disabled")))
}
