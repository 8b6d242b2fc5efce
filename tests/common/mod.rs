//! Common test utilities
//!
//! Fixtures that build Perspective-like pages in the mock driver. Widgets
//! re-render their own subtree from shared state, the way the real
//! components do, so page objects see fresh nodes after each interaction.

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use perspective_automation::driver::{DomEvent, MockDom, MockDriver, NodeId, NodeSpec, Platform};
use perspective_automation::{Session, SessionConfig};
use std::sync::{Arc, Mutex};

/// Wait used by every fixture session
pub const WAIT_TIMEOUT_MS: u64 = 300;

/// Session over a fresh mock driver with short waits
pub fn setup_session() -> (Arc<MockDriver>, Arc<Session>) {
    let driver = Arc::new(MockDriver::new());
    let config = SessionConfig {
        wait_timeout_ms: WAIT_TIMEOUT_MS,
        poll_interval_ms: 10,
        keystroke_delay_ms: 1,
        platform: Some(Platform::Linux),
        ..SessionConfig::default()
    };
    let session = Session::new(driver.clone(), config);
    (driver, session)
}

fn cell(column: &str, value: &str) -> NodeSpec {
    NodeSpec::new("div")
        .class("ia_table__cell")
        .attr("data-column-id", column)
        .child(NodeSpec::new("div").class("content").text(value))
}

/// State of a paged table fixture
#[derive(Debug)]
pub struct PagedState {
    pub page: u32,
    /// Row count of each page
    pub page_rows: Vec<usize>,
    /// Pages rendered after the initial one, in order
    pub visits: Vec<u32>,
}

#[derive(Debug, Clone, Copy)]
struct Controls {
    first: Option<NodeId>,
    prev: NodeId,
    next: NodeId,
    last: Option<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Simple,
    Robust,
    /// ROBUST without the jump field and the first/last controls
    RobustMinimal,
}

/// Table with a SIMPLE or ROBUST pager
///
/// Rows carry an `id` column numbered across pages (`row-1`, `row-2`, ...)
/// and a `page` column. The ROBUST layout only renders the page buttons next
/// to the current page and ignores out-of-range jumps.
#[derive(Debug, Clone)]
pub struct PagedTable {
    pub table: NodeId,
    body: NodeId,
    pages: NodeId,
    controls: Option<Controls>,
    pub jump: Option<NodeId>,
    pub state: Arc<Mutex<PagedState>>,
}

impl PagedTable {
    pub fn robust(dom: &mut MockDom, id: &str, page_rows: Vec<usize>, start: u32) -> Self {
        Self::build(dom, id, page_rows, start, Layout::Robust)
    }

    /// ROBUST pager with only next/prev controls and no jump field
    pub fn robust_minimal(dom: &mut MockDom, id: &str, page_rows: Vec<usize>, start: u32) -> Self {
        Self::build(dom, id, page_rows, start, Layout::RobustMinimal)
    }

    pub fn simple(dom: &mut MockDom, id: &str, page_rows: Vec<usize>, start: u32) -> Self {
        Self::build(dom, id, page_rows, start, Layout::Simple)
    }

    fn build(dom: &mut MockDom, id: &str, page_rows: Vec<usize>, start: u32, layout: Layout) -> Self {
        let robust = layout != Layout::Simple;
        let shortcuts = layout == Layout::Robust;
        let root = dom.root();
        let table = dom.append(root, NodeSpec::new("div").id(id).class("ia_tableComponent"));
        dom.append(
            table,
            NodeSpec::new("div").class("ia_table__head").children(["id", "page"].map(|column| {
                NodeSpec::new("div")
                    .class("ia_table__head__header__cell")
                    .attr("data-column-id", column)
                    .child(NodeSpec::new("div").class("content").text(column.to_uppercase()))
            })),
        );
        let body = dom.append(table, NodeSpec::new("div").class("ia_table__body"));
        let pager = dom.append(table, NodeSpec::new("div").class("ia_pager"));

        let controls = if robust {
            let first = shortcuts.then(|| dom.append(pager, NodeSpec::new("div").class("ia_pager__first")));
            let prev = dom.append(pager, NodeSpec::new("div").class("ia_pager__prev"));
            let next = dom.append(pager, NodeSpec::new("div").class("ia_pager__next"));
            let last = shortcuts.then(|| dom.append(pager, NodeSpec::new("div").class("ia_pager__last")));
            Some(Controls { first, prev, next, last })
        } else {
            None
        };
        let pages = dom.append(pager, NodeSpec::new("div").class("ia_pager__pages"));
        let jump = if shortcuts {
            Some(dom.append(pager, NodeSpec::new("input").class("ia_pager__jump")))
        } else {
            None
        };
        if robust {
            dom.append(
                pager,
                NodeSpec::new("select")
                    .class("ia_pager__pageSize")
                    .attr("value", "10")
                    .children(["10", "25", "50"].map(|size| NodeSpec::new("option").text(size))),
            );
        }

        let fixture = Self {
            table,
            body,
            pages,
            controls,
            jump,
            state: Arc::new(Mutex::new(PagedState {
                page: start,
                page_rows,
                visits: Vec::new(),
            })),
        };

        if let Some(controls) = controls {
            if let Some(first) = controls.first {
                let f = fixture.clone();
                dom.on(first, DomEvent::Click, move |dom, _| f.go_to(dom, 1));
            }
            let f = fixture.clone();
            dom.on(controls.prev, DomEvent::Click, move |dom, _| {
                let page = f.page();
                f.go_to(dom, page.saturating_sub(1));
            });
            let f = fixture.clone();
            dom.on(controls.next, DomEvent::Click, move |dom, _| {
                let page = f.page();
                f.go_to(dom, page + 1);
            });
            if let Some(last) = controls.last {
                let f = fixture.clone();
                dom.on(last, DomEvent::Click, move |dom, _| {
                    let total = f.total();
                    f.go_to(dom, total);
                });
            }
        }
        if let Some(jump) = jump {
            let f = fixture.clone();
            dom.on(jump, DomEvent::Submit, move |dom, input| {
                if let Ok(page) = dom.value(input).trim().parse::<u32>() {
                    f.go_to(dom, page);
                }
            });
        }

        fixture.render(dom);
        fixture
    }

    pub fn page(&self) -> u32 {
        self.state.lock().unwrap().page
    }

    pub fn total(&self) -> u32 {
        self.state.lock().unwrap().page_rows.len() as u32
    }

    pub fn visits(&self) -> Vec<u32> {
        self.state.lock().unwrap().visits.clone()
    }

    /// Switch pages the way the component does; out-of-range pages are ignored
    pub fn go_to(&self, dom: &mut MockDom, page: u32) {
        {
            let mut state = self.state.lock().unwrap();
            if page < 1 || page as usize > state.page_rows.len() || page == state.page {
                return;
            }
            state.page = page;
            state.visits.push(page);
        }
        self.render(dom);
    }

    fn render(&self, dom: &mut MockDom) {
        let (page, total, rows, offset) = {
            let state = self.state.lock().unwrap();
            let index = state.page as usize - 1;
            let offset: usize = state.page_rows[..index].iter().sum();
            (state.page, state.page_rows.len() as u32, state.page_rows[index], offset)
        };

        dom.clear_children(self.body);
        for row in 0..rows {
            let id = format!("row-{}", offset + row + 1);
            dom.append(
                self.body,
                NodeSpec::new("div")
                    .class("ia_table__body__rowGroup")
                    .children([cell("id", &id), cell("page", &page.to_string())]),
            );
        }

        dom.clear_children(self.pages);
        let window = if self.controls.is_some() {
            page.saturating_sub(1).max(1)..=(page + 1).min(total)
        } else {
            1..=total
        };
        for number in window {
            let f = self.clone();
            let mut button = NodeSpec::new("div")
                .class("ia_pager__page")
                .text(number.to_string())
                .on(DomEvent::Click, move |dom, _| f.go_to(dom, number));
            if number == page {
                button = button.class("ia_pager__page--active");
            }
            dom.append(self.pages, button);
        }

        if let Some(controls) = self.controls {
            for (control, disabled) in [
                (controls.first, page == 1),
                (Some(controls.prev), page == 1),
                (Some(controls.next), page == total),
                (controls.last, page == total),
            ] {
                let Some(control) = control else { continue };
                if disabled {
                    dom.add_class(control, "ia_pager__control--disabled");
                } else {
                    dom.remove_class(control, "ia_pager__control--disabled");
                }
            }
        }
    }
}

/// Multi-select dropdown; clicking an option adds its pill
pub fn multi_select_dropdown(dom: &mut MockDom, id: &str, options: &[&str], selected: &[&str]) -> NodeId {
    let root = dom.root();
    let dropdown = dom.append(
        root,
        NodeSpec::new("div")
            .id(id)
            .class("ia_dropdown")
            .class("iaDropdownCommon_multi-select"),
    );
    let pills = dom.append(dropdown, NodeSpec::new("div").class("ia_dropdown__values"));
    for label in selected {
        dom.append(pills, NodeSpec::new("div").class("ia_dropdown__valuePill").text(*label));
    }
    for label in options {
        let label = label.to_string();
        dom.append(
            dropdown,
            NodeSpec::new("div")
                .class("ia_dropdown__option")
                .text(label.clone())
                .on(DomEvent::Click, move |dom, _| {
                    dom.append(pills, NodeSpec::new("div").class("ia_dropdown__valuePill").text(label.clone()));
                }),
        );
    }
    dropdown
}

/// Accordion with collapsed sections; returns the header nodes
pub fn accordion(dom: &mut MockDom, id: &str, sections: &[&str]) -> Vec<NodeId> {
    let root = dom.root();
    let accordion = dom.append(root, NodeSpec::new("div").id(id).class("ia_accordionComponent"));
    let mut headers = Vec::new();
    for label in sections {
        let body = NodeSpec::new("div").class("ia_accordionComponent__body").hidden();
        let header = dom.append(
            accordion,
            NodeSpec::new("div")
                .class("ia_accordionComponent__header")
                .child(NodeSpec::new("div").class("ia_accordionComponent__header__text").text(*label))
                .child(NodeSpec::new("svg").class("ia_accordionComponent__header__chevron")),
        );
        let body = dom.append(accordion, body);
        dom.on(header, DomEvent::Click, move |dom, header| {
            let Some(chevron) = dom.children(header).last().copied() else {
                return;
            };
            let expanded = dom.has_class(chevron, "expanded");
            if expanded {
                dom.remove_class(chevron, "expanded");
            } else {
                dom.add_class(chevron, "expanded");
            }
            dom.set_displayed(body, !expanded);
        });
        headers.push(header);
    }
    headers
}

/// State of a date-time input fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerState {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour12: u32,
    pub minute: u32,
    pub pm: bool,
}

impl PickerState {
    pub fn value(&self) -> Option<NaiveDateTime> {
        let hour = self.hour12 % 12 + if self.pm { 12 } else { 0 };
        let date = NaiveDate::from_ymd_opt(self.year, self.month, self.day)?;
        let time = NaiveTime::from_hms_opt(hour, self.minute, 0)?;
        Some(date.and_time(time))
    }
}

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Date-time input with a picker modal rendered at the document root
///
/// The display input shows `%m/%d/%Y %I:%M %p` and is re-rendered after every
/// change in the picker.
pub fn datetime_input(dom: &mut MockDom, id: &str) -> Arc<Mutex<PickerState>> {
    let state = Arc::new(Mutex::new(PickerState {
        year: 2023,
        month: 1,
        day: 1,
        hour12: 12,
        minute: 0,
        pm: false,
    }));

    let root = dom.root();
    let input = dom.append(root, NodeSpec::new("div").id(id).class("ia_dateTimeInputComponent"));
    let display = dom.append(input, NodeSpec::new("input"));
    let picker = dom.append(root, NodeSpec::new("div").class("ia_dateTimeInputComponent__picker").hidden());

    let render = {
        let state = state.clone();
        move |dom: &mut MockDom| {
            if let Some(value) = state.lock().unwrap().value() {
                dom.set_attr(display, "value", &value.format("%m/%d/%Y %I:%M %p").to_string());
            }
        }
    };
    render(dom);

    dom.on(input, DomEvent::Click, move |dom, _| dom.set_displayed(picker, true));

    let year = dom.append(
        picker,
        NodeSpec::new("select")
            .class("ia_datePicker__yearSelect")
            .children((2020..=2030).map(|y| NodeSpec::new("option").text(y.to_string()))),
    );
    let (s, r) = (state.clone(), render.clone());
    dom.on(year, DomEvent::Change, move |dom, select| {
        if let Ok(year) = dom.value(select).parse() {
            s.lock().unwrap().year = year;
        }
        r(dom);
    });

    let month = dom.append(
        picker,
        NodeSpec::new("select")
            .class("ia_datePicker__monthSelect")
            .children(MONTHS.map(|m| NodeSpec::new("option").text(m))),
    );
    let (s, r) = (state.clone(), render.clone());
    dom.on(month, DomEvent::Change, move |dom, select| {
        if let Some(index) = MONTHS.iter().position(|m| *m == dom.value(select)) {
            s.lock().unwrap().month = index as u32 + 1;
        }
        r(dom);
    });

    for day in 1..=31u32 {
        let (s, r) = (state.clone(), render.clone());
        dom.append(
            picker,
            NodeSpec::new("div")
                .class("ia_datePicker__day")
                .attr("data-day", day.to_string())
                .text(day.to_string())
                .on(DomEvent::Click, move |dom, _| {
                    s.lock().unwrap().day = day;
                    r(dom);
                }),
        );
    }

    for (class, is_hour) in [("ia_timePicker__hour", true), ("ia_timePicker__minute", false)] {
        let (s, r) = (state.clone(), render.clone());
        dom.append(
            picker,
            NodeSpec::new("input").class(class).on(DomEvent::Input, move |dom, field| {
                if let Ok(number) = dom.value(field).parse() {
                    let mut state = s.lock().unwrap();
                    if is_hour {
                        state.hour12 = number;
                    } else {
                        state.minute = number;
                    }
                }
                r(dom);
            }),
        );
    }

    for (label, pm) in [("AM", false), ("PM", true)] {
        let (s, r) = (state.clone(), render.clone());
        dom.append(
            picker,
            NodeSpec::new("div")
                .class("ia_timePicker__meridiem")
                .attr("data-meridiem", label)
                .text(label)
                .on(DomEvent::Click, move |dom, _| {
                    s.lock().unwrap().pm = pm;
                    r(dom);
                }),
        );
    }

    state
}
