//! The invoice page as a sequence of declarative blocks
//!
//! Nothing is drawn here. `Layout::of` decides what goes where, in
//! millimeters from the top-left corner of an A4 portrait page, and
//! `render::draw` interprets the result in a single pass.
//!
//! Positions flow like a typewriter: a cursor starts at the top-left margin,
//! rows of cells are laid left to right from it, and rows that `advance`
//! bring it back to the left margin one row lower.

use crate::lib::invoice::Invoice;

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN_LEFT: f32 = 15.0;
pub const MARGIN_TOP: f32 = 20.0;
pub const MARGIN_RIGHT: f32 = 15.0;

/// 8-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const BLACK: Rgb = Rgb(0, 0, 0);
const TITLE: Rgb = Rgb(34, 139, 34);
const RULE: Rgb = Rgb(200, 200, 200);
const HEADING: Rgb = Rgb(230, 230, 230);
const TOTAL: Rgb = Rgb(255, 0, 128);

/// Font of a cell; the family is fixed, only weight, size (pt) and color vary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub bold: bool,
    pub size: f32,
    pub color: Rgb,
}

impl Style {
    pub const fn regular(size: f32) -> Self {
        Self { bold: false, size, color: BLACK }
    }

    pub const fn bold(size: f32) -> Self {
        Self { bold: true, size, color: BLACK }
    }

    pub const fn colored(self, color: Rgb) -> Self {
        Self { color, ..self }
    }
}

const BODY: Style = Style::regular(10.0);
const LABEL: Style = Style::bold(10.0);
const SECTION: Style = Style::bold(11.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    None,
    /// full frame
    All,
    /// left, right and bottom edges, for rows stacked under a framed header
    Open,
}

/// A rectangle of text
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// `None` extends the cell to the right margin
    pub width: Option<f32>,
    pub height: f32,
    pub text: String,
    pub align: Align,
    pub border: Border,
    pub fill: Option<Rgb>,
    pub style: Style,
}

impl Cell {
    /// Fixed-width cell
    pub fn new<S>(width: f32, height: f32, text: S) -> Self
    where S: ToString {
        Self {
            width: Some(width),
            height,
            text: text.to_string(),
            align: Align::Left,
            border: Border::None,
            fill: None,
            style: BODY,
        }
    }

    /// Cell running up to the right margin
    pub fn span<S>(height: f32, text: S) -> Self
    where S: ToString {
        Self { width: None, ..Self::new(0.0, height, text) }
    }

    pub fn align(self, align: Align) -> Self {
        Self { align, ..self }
    }

    pub fn border(self, border: Border) -> Self {
        Self { border, ..self }
    }

    pub fn fill(self, color: Rgb) -> Self {
        Self { fill: Some(color), ..self }
    }

    pub fn style(self, style: Style) -> Self {
        Self { style, ..self }
    }
}

/// One step of the drawing pass
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// place cells left to right from the cursor,
    /// then return to the left margin one row lower if `advance`
    Row { cells: Vec<Cell>, advance: bool },
    /// move the cursor to an absolute position
    Goto { x: f32, y: f32 },
    /// return to the left margin and move down
    Skip(f32),
    /// horizontal line across the content width at the cursor
    Rule(Rgb),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Sender,
    Recipient,
    Project,
    Items,
    Payment,
    Total,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub section: Section,
    pub ops: Vec<Op>,
}

impl Block {
    fn new(section: Section) -> Self {
        Self { section, ops: Vec::new() }
    }

    /// Row that leaves the cursor where the last cell ends
    fn cells(mut self, cells: Vec<Cell>) -> Self {
        self.ops.push(Op::Row { cells, advance: false });
        self
    }

    /// Row followed by a line break
    fn line(mut self, cells: Vec<Cell>) -> Self {
        self.ops.push(Op::Row { cells, advance: true });
        self
    }

    fn goto(mut self, x: f32, y: f32) -> Self {
        self.ops.push(Op::Goto { x, y });
        self
    }

    fn skip(mut self, height: f32) -> Self {
        self.ops.push(Op::Skip(height));
        self
    }

    fn rule(mut self, color: Rgb) -> Self {
        self.ops.push(Op::Rule(color));
        self
    }
}

/// The whole page
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// document title in the file metadata
    pub title: String,
    pub blocks: Vec<Block>,
}

/// Widths, headings and alignment of the item table
const ITEM_COLUMNS: [(f32, &str, Align); 4] = [
    (100.0, "Description", Align::Left),
    (20.0, "Qty", Align::Center),
    (30.0, "Unit price", Align::Center),
    (30.0, "Total price", Align::Center),
];
const ITEM_ROW: f32 = 8.0;
const PAYMENT_LABEL: f32 = 40.0;
const PAYMENT_VALUE: f32 = 80.0;
const PROJECT_LABEL: f32 = 30.0;
const PROJECT_VALUE: f32 = 60.0;

impl Layout {
    /// Lay out every section of `inv` in order
    pub fn of(inv: &Invoice) -> Self {
        Self {
            title: format!("Invoice {}", inv.number),
            blocks: vec![
                header(inv),
                sender(inv),
                recipient(inv),
                project(inv),
                items(inv),
                payment(inv),
                total(inv),
            ],
        }
    }
}

fn header(inv: &Invoice) -> Block {
    let right = |text: String| Cell::span(5.0, text).align(Align::Right);
    Block::new(Section::Header)
        .cells(vec![Cell::new(100.0, 10.0, "INVOICE").style(Style::bold(20.0).colored(TITLE))])
        .goto(140.0, MARGIN_TOP)
        .line(vec![right(format!("Invoice # {}", inv.number))])
        .line(vec![right(format!("Date: {}", inv.invoice_date.dmy()))])
        .line(vec![right(format!("Due date: {}", inv.due_date.dmy()))])
        .skip(10.0)
}

fn sender(inv: &Invoice) -> Block {
    let s = &inv.sender;
    [
        s.name.clone(),
        s.city.clone(),
        s.address.clone(),
        format!("Reg Nr: {}", s.reg_nr),
        format!("Phone: {}", s.phone),
    ]
    .iter()
    .fold(
        Block::new(Section::Sender).line(vec![Cell::span(6.0, "From").style(SECTION)]),
        |block, text| block.line(vec![Cell::span(5.0, text)]),
    )
    .skip(8.0)
}

fn recipient(inv: &Invoice) -> Block {
    let r = &inv.recipient;
    std::iter::once(&r.name)
        .chain(r.address.iter())
        .fold(
            Block::new(Section::Recipient).line(vec![Cell::span(6.0, "Bill To").style(SECTION)]),
            |block, text| block.line(vec![Cell::span(5.0, text)]),
        )
        .skip(5.0)
}

fn project(inv: &Invoice) -> Block {
    let pair = |label: &str, value: &str| {
        vec![
            Cell::new(PROJECT_LABEL, 5.0, label).style(LABEL),
            Cell::new(PROJECT_VALUE, 5.0, value),
        ]
    };
    Block::new(Section::Project)
        .line(pair("Project:", &inv.project))
        .line(pair("Period:", &inv.period))
        .skip(5.0)
        .rule(RULE)
        .skip(7.0)
}

fn items(inv: &Invoice) -> Block {
    let heading = ITEM_COLUMNS
        .iter()
        .map(|(width, title, align)| {
            Cell::new(*width, ITEM_ROW, title)
                .align(*align)
                .border(Border::All)
                .fill(HEADING)
                .style(LABEL)
        })
        .collect();
    let money = |amount: crate::lib::item::Amount| amount.with_symbol(&inv.currency);
    inv.items
        .iter()
        .fold(Block::new(Section::Items).line(heading), |block, item| {
            let values = [
                item.description.clone(),
                item.quantity.to_string(),
                money(item.unit_price),
                money(item.total()),
            ];
            block.line(
                ITEM_COLUMNS
                    .iter()
                    .zip(values.iter())
                    .map(|((width, _, align), value)| {
                        Cell::new(*width, ITEM_ROW, value).align(*align).border(Border::Open)
                    })
                    .collect(),
            )
        })
        .skip(5.0)
}

fn payment(inv: &Invoice) -> Block {
    let rows = [
        ("Account holder:", &inv.sender.name),
        ("BIC:", &inv.payment.bic),
        ("IBAN:", &inv.payment.iban),
        ("Address:", &inv.payment.address),
    ];
    let heading = Cell::new(PAYMENT_LABEL + PAYMENT_VALUE, 8.0, "Payment details")
        .border(Border::All)
        .fill(HEADING)
        .style(LABEL);
    rows.iter()
        .fold(Block::new(Section::Payment).line(vec![heading]), |block, (label, value)| {
            block.line(vec![
                Cell::new(PAYMENT_LABEL, 8.0, label).border(Border::All),
                Cell::new(PAYMENT_VALUE, 8.0, value).border(Border::All),
            ])
        })
        .skip(5.0)
}

fn total(inv: &Invoice) -> Block {
    let subtotal = inv.subtotal.with_symbol(&inv.currency);
    Block::new(Section::Total)
        .cells(vec![
            Cell::new(100.0, 6.0, ""),
            Cell::new(20.0, 6.0, ""),
            Cell::new(30.0, 6.0, "Subtotal:").align(Align::Right).style(LABEL),
            Cell::new(30.0, 6.0, &subtotal).align(Align::Right),
        ])
        .skip(10.0)
        .cells(vec![Cell::span(8.0, subtotal)
            .align(Align::Right)
            .style(Style::bold(14.0).colored(TOTAL))])
}
