use crate::models::{Finding, Lodge, ScanOutcome};
use crate::scanner::config::ScanConfig;
use crate::scanner::error::ScanError;
use crate::scanner::months::month_label;
use crate::scanner::traits::AvailabilityCheck;
use crate::scanner::types::ScanParams;
use async_trait::async_trait;
use headless_chrome::{Element, Tab};
use scraper::{Html, Selector};
use serde_json::json;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info};

// Controls on the lodging page.
const LODGING_SELECT: &str = "select#container-widget-hero_InitialProductSelection";
const ADULTS_SELECT: &str = "select#container-widget-hero_Adults";
const CHILDREN_SELECT: &str = "select#container-widget-hero_Children";
const CALENDAR_TRIGGER: &str = "//*[@id=\"container-widget-hero\"]/form/div[8]/div/div";

// Pieces of the date picker. These are positional because the widget carries
// no stable ids below its container.
const MONTH_SELECT: &str = "//*[@id='ui-datepicker-div']/div[1]/div/select[1]";
const DAY_GRID_BODY: &str = "//*[@id='ui-datepicker-div']/table/tbody";
const NEXT_MONTH: &str = "//*[@id='ui-datepicker-div']/div[1]/a[2]";

/// Browser-backed availability scanner for the lodging page's date picker.
pub struct CalendarScanner {
    tab: Arc<Tab>,
    config: ScanConfig,
}

impl CalendarScanner {
    pub fn new(tab: Arc<Tab>, config: ScanConfig) -> Self {
        Self { tab, config }
    }

    /// Run the whole flow for one lodge: navigate, select the lodge and
    /// occupancy, open the calendar, then scan the month pages.
    pub fn run(&self, lodge: &Lodge, params: &ScanParams) -> Result<ScanOutcome, ScanError> {
        self.open_lodging_page()?;
        self.select_lodge(&lodge.name)?;
        self.set_occupancy(params.adults, params.children)?;
        self.open_calendar()?;

        let mut picker = LivePicker {
            tab: &self.tab,
            config: &self.config,
        };
        scan_months(&mut picker, &lodge.label, params.month_pages)
    }

    /// Navigate to the lodging page and let it settle.
    pub fn open_lodging_page(&self) -> Result<(), ScanError> {
        info!("Opening {}", self.config.start_url);
        self.tab
            .navigate_to(&self.config.start_url)
            .map_err(|e| ScanError::Navigation(e.to_string()))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| ScanError::Navigation(e.to_string()))?;
        thread::sleep(self.config.settle());
        Ok(())
    }

    /// Point the lodging dropdown at the given product.
    pub fn select_lodge(&self, name: &str) -> Result<(), ScanError> {
        debug!("Selecting lodge {:?}", name);
        let dropdown = self.wait_for(LODGING_SELECT, "lodging dropdown")?;
        select_option(&dropdown, "lodging dropdown", name)
    }

    /// Enter the number of adults and children.
    fn set_occupancy(&self, adults: u8, children: u8) -> Result<(), ScanError> {
        debug!("Setting occupancy: {} adults, {} children", adults, children);
        let dropdown = self.wait_for(ADULTS_SELECT, "adults dropdown")?;
        select_option(&dropdown, "adults dropdown", &adults.to_string())?;

        let dropdown = self.wait_for(CHILDREN_SELECT, "children dropdown")?;
        select_option(&dropdown, "children dropdown", &children.to_string())
    }

    /// Click the calendar field so the date picker opens.
    fn open_calendar(&self) -> Result<(), ScanError> {
        let trigger = self.wait_for_xpath(CALENDAR_TRIGGER, "calendar trigger")?;
        trigger
            .click()
            .map_err(|e| ScanError::JavaScript(e.to_string()))?;
        Ok(())
    }

    fn wait_for(&self, selector: &str, what: &str) -> Result<Element<'_>, ScanError> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, self.config.timeout())
            .map_err(|_| ScanError::ElementNotFound(what.to_string()))
    }

    fn wait_for_xpath(&self, selector: &str, what: &str) -> Result<Element<'_>, ScanError> {
        self.tab
            .wait_for_xpath_with_custom_timeout(selector, self.config.timeout())
            .map_err(|_| ScanError::ElementNotFound(what.to_string()))
    }
}

#[async_trait]
impl AvailabilityCheck for CalendarScanner {
    async fn scan(&self, lodge: &Lodge, params: &ScanParams) -> Result<ScanOutcome, ScanError> {
        self.run(lodge, params)
    }

    fn source_name(&self) -> &'static str {
        "rockharborlodge.com"
    }
}

/// Set a `<select>` control's value and fire the change event the widget
/// listens for. The value is read back so a missing option surfaces instead
/// of leaving the control silently unchanged.
fn select_option(select: &Element<'_>, control: &str, value: &str) -> Result<(), ScanError> {
    select
        .click()
        .map_err(|e| ScanError::JavaScript(e.to_string()))?;

    let result = select
        .call_js_fn(
            r#"function(value) {
                this.value = value;
                this.dispatchEvent(new Event('change', { bubbles: true }));
                return this.value;
            }"#,
            vec![json!(value)],
            false,
        )
        .map_err(|e| ScanError::JavaScript(e.to_string()))?;

    let applied = result
        .value
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .unwrap_or_default();

    if applied != value {
        return Err(ScanError::OptionNotFound {
            control: control.to_string(),
            value: value.to_string(),
        });
    }

    Ok(())
}

/// The operations the month loop needs from a rendered date picker. The live
/// implementation drives the browser; tests substitute a scripted fake.
pub trait DatePicker {
    /// Block until the page has settled after opening or advancing.
    fn settle(&mut self) -> Result<(), ScanError>;

    /// Zero-based month index currently shown by the month select.
    fn month_index(&mut self) -> Result<usize, ScanError>;

    /// Outer HTML of the day-grid table body.
    fn grid_html(&mut self) -> Result<String, ScanError>;

    /// Click through to the next month.
    fn advance(&mut self) -> Result<(), ScanError>;
}

/// Scan consecutive month pages for a bookable day.
///
/// Stops at the first finding. The picker is advanced between pages but not
/// after the last one, and the first missing element aborts the scan.
pub fn scan_months(
    picker: &mut dyn DatePicker,
    lodge_label: &str,
    month_pages: u32,
) -> Result<ScanOutcome, ScanError> {
    for page in 0..month_pages {
        picker.settle()?;

        let index = picker.month_index()?;
        let month =
            month_label(index).ok_or_else(|| ScanError::UnexpectedMonth(index.to_string()))?;

        let grid = picker.grid_html()?;
        if let Some(day) = first_bookable_day(&grid) {
            let finding = Finding::new(lodge_label, month, &day);
            info!("{}", finding);
            return Ok(ScanOutcome::Available(finding));
        }

        debug!("No availability for {} in {}", lodge_label, month);
        if page + 1 < month_pages {
            picker.advance()?;
        }
    }

    Ok(ScanOutcome::Clear {
        months_scanned: month_pages,
    })
}

/// Row-major scan of the captured day grid. A cell rendered with an anchor
/// is a bookable day; the anchor's text is the day-of-month label.
pub fn first_bookable_day(grid_html: &str) -> Option<String> {
    // The capture is a bare <tbody>; hand the parser its table context so
    // the rows survive parsing.
    let document = Html::parse_document(&format!("<table>{grid_html}</table>"));
    let row_selector = Selector::parse("tbody tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let link_selector = Selector::parse("a").unwrap();

    for row in document.select(&row_selector) {
        for cell in row.select(&cell_selector) {
            if let Some(link) = cell.select(&link_selector).next() {
                let day = link.text().collect::<String>().trim().to_string();
                return Some(day);
            }
        }
    }

    None
}

/// Live date picker driven through the shared browser tab.
struct LivePicker<'a> {
    tab: &'a Arc<Tab>,
    config: &'a ScanConfig,
}

impl DatePicker for LivePicker<'_> {
    fn settle(&mut self) -> Result<(), ScanError> {
        // The widget re-fetches availability after every interaction and
        // exposes no load event to hook, so give it a beat.
        thread::sleep(self.config.settle());
        Ok(())
    }

    fn month_index(&mut self) -> Result<usize, ScanError> {
        let select = self
            .tab
            .wait_for_xpath_with_custom_timeout(MONTH_SELECT, self.config.timeout())
            .map_err(|_| ScanError::ElementNotFound("month dropdown".to_string()))?;

        let value = read_value(&select)?;
        value
            .parse()
            .map_err(|_| ScanError::UnexpectedMonth(value))
    }

    fn grid_html(&mut self) -> Result<String, ScanError> {
        let body = self
            .tab
            .wait_for_xpath_with_custom_timeout(DAY_GRID_BODY, self.config.timeout())
            .map_err(|_| ScanError::ElementNotFound("day grid".to_string()))?;

        body.get_content()
            .map_err(|e| ScanError::JavaScript(e.to_string()))
    }

    fn advance(&mut self) -> Result<(), ScanError> {
        let next = self
            .tab
            .wait_for_xpath_with_custom_timeout(NEXT_MONTH, self.config.timeout())
            .map_err(|_| ScanError::ElementNotFound("next month button".to_string()))?;

        next.click()
            .map_err(|e| ScanError::JavaScript(e.to_string()))?;
        Ok(())
    }
}

/// Read a control's current value through the DOM.
fn read_value(element: &Element<'_>) -> Result<String, ScanError> {
    let result = element
        .call_js_fn("function() { return this.value; }", vec![], false)
        .map_err(|e| ScanError::JavaScript(e.to_string()))?;

    result
        .value
        .and_then(|v| v.as_str().map(|s| s.to_string()))
        .ok_or_else(|| ScanError::JavaScript("value read returned nothing".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::browser::BrowserSession;

    const EMPTY_GRID: &str = r#"<tbody>
        <tr>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">1</span></td>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">2</span></td>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">3</span></td>
        </tr>
        <tr>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">4</span></td>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">5</span></td>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">6</span></td>
        </tr>
    </tbody>"#;

    // Third cell of the second row is rendered as a booking link.
    const GRID_WITH_DAY_15: &str = r##"<tbody>
        <tr>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">6</span></td>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">7</span></td>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">8</span></td>
        </tr>
        <tr>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">13</span></td>
            <td class="ui-datepicker-unselectable ui-state-disabled"><span class="ui-state-default">14</span></td>
            <td data-handler="selectDay"><a class="ui-state-default" href="#">15</a></td>
            <td data-handler="selectDay"><a class="ui-state-default" href="#">16</a></td>
        </tr>
    </tbody>"##;

    /// Scripted stand-in for the live date picker.
    struct FakePicker {
        start_month: usize,
        grids: Vec<&'static str>,
        page: usize,
        advances: u32,
        month_select_missing_on: Option<usize>,
    }

    impl FakePicker {
        fn new(start_month: usize) -> Self {
            Self {
                start_month,
                grids: Vec::new(),
                page: 0,
                advances: 0,
                month_select_missing_on: None,
            }
        }
    }

    impl DatePicker for FakePicker {
        fn settle(&mut self) -> Result<(), ScanError> {
            Ok(())
        }

        fn month_index(&mut self) -> Result<usize, ScanError> {
            if self.month_select_missing_on == Some(self.page) {
                return Err(ScanError::ElementNotFound("month dropdown".to_string()));
            }
            Ok(self.start_month + self.page)
        }

        fn grid_html(&mut self) -> Result<String, ScanError> {
            Ok(self
                .grids
                .get(self.page)
                .copied()
                .unwrap_or(EMPTY_GRID)
                .to_string())
        }

        fn advance(&mut self) -> Result<(), ScanError> {
            self.advances += 1;
            self.page += 1;
            Ok(())
        }
    }

    #[test]
    fn clear_scan_advances_seven_times_for_eight_pages() {
        let mut picker = FakePicker::new(0);
        let outcome = scan_months(&mut picker, "Rock Harbor", 8).unwrap();

        assert!(matches!(outcome, ScanOutcome::Clear { months_scanned: 8 }));
        assert_eq!(picker.advances, 7);
    }

    #[test]
    fn stops_at_first_bookable_day() {
        let mut picker = FakePicker::new(8);
        picker.grids = vec![GRID_WITH_DAY_15];

        let outcome = scan_months(&mut picker, "Rock Harbor", 8).unwrap();
        match outcome {
            ScanOutcome::Available(finding) => {
                assert_eq!(finding.lodge, "Rock Harbor");
                assert_eq!(finding.month, "Sep");
                assert_eq!(finding.day, "15");
            }
            other => panic!("expected a finding, got {:?}", other),
        }
        assert_eq!(picker.advances, 0);
    }

    #[test]
    fn missing_month_select_aborts_without_further_advances() {
        let mut picker = FakePicker::new(0);
        picker.month_select_missing_on = Some(4);

        let err = scan_months(&mut picker, "Washington Harbor", 8).unwrap_err();
        assert!(matches!(err, ScanError::ElementNotFound(_)));
        assert_eq!(picker.advances, 4);
    }

    #[test]
    fn month_index_out_of_range_aborts() {
        let mut picker = FakePicker::new(12);
        let err = scan_months(&mut picker, "Rock Harbor", 1).unwrap_err();
        assert!(matches!(err, ScanError::UnexpectedMonth(_)));
    }

    #[test]
    fn empty_grid_has_no_bookable_day() {
        assert_eq!(first_bookable_day(EMPTY_GRID), None);
    }

    #[test]
    fn bookable_day_found_in_row_major_order() {
        assert_eq!(first_bookable_day(GRID_WITH_DAY_15), Some("15".to_string()));
    }

    #[test]
    #[ignore = "drives the live site; requires a local Chrome install"]
    fn live_lodge_reselection_last_wins() {
        let config = ScanConfig::default();
        let session = BrowserSession::launch(&config).expect("launch");
        let tab = session.new_tab().expect("tab");
        let scanner = CalendarScanner::new(tab, config);

        scanner.open_lodging_page().expect("navigate");
        // select_option reads the control back, so each call asserts the
        // dropdown took the most recent selection.
        scanner
            .select_lodge(&crate::models::Lodge::rock_harbor().name)
            .expect("first selection");
        scanner
            .select_lodge(&crate::models::Lodge::washington_harbor().name)
            .expect("second selection");
    }
}
