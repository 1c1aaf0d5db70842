// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! PDF layout for [`Report`], built in memory with the standard Helvetica fonts.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

use crate::error::{OutlayError, Result};
use crate::report::Report;
use crate::utils::{fmt_money, fmt_percent};

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const FOOTER_Y: f32 = 30.0;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const ROW_HEIGHT: f32 = 18.0;
const BODY_SIZE: f32 = 9.0;

type Rgb = (f32, f32, f32);
const INK: Rgb = (0.13, 0.13, 0.13);
const ACCENT: Rgb = (0.17, 0.24, 0.31);
const WHITE: Rgb = (1.0, 1.0, 1.0);
const STRIPE: Rgb = (0.95, 0.96, 0.97);
const TOTAL_FILL: Rgb = (0.85, 0.89, 0.93);

#[derive(Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
        }
    }
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

struct Column {
    title: &'static str,
    width: f32,
    align: Align,
}

struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    total: Option<Vec<String>>,
}

/// Pages are kept as raw operation lists until the page count is known.
struct Layout {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn page_break(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN + FOOTER_Y {
            self.page_break();
        }
    }

    fn text_at(&mut self, x: f32, y: f32, font: Font, size: f32, color: Rgb, s: &str) {
        self.ops.extend([
            fill_color(color),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.resource().into(), size.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_text(s))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.ops.extend([
            fill_color(color),
            Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]),
            Operation::new("f", vec![]),
        ]);
    }

    fn line(&mut self, s: &str, font: Font, size: f32) {
        let advance = size + 6.0;
        self.ensure_space(advance);
        self.y -= advance;
        self.text_at(MARGIN, self.y, font, size, INK, s);
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }

    fn heading(&mut self, s: &str) {
        // Keep a heading together with at least a couple of rows.
        self.ensure_space(20.0 + 3.0 * ROW_HEIGHT);
        self.gap(12.0);
        self.y -= 14.0;
        self.text_at(MARGIN, self.y, Font::Bold, 14.0, ACCENT, s);
        self.y -= 4.0;
        self.ops.extend([
            stroke_color(ACCENT),
            Operation::new("w", vec![1.0f32.into()]),
            Operation::new("m", vec![MARGIN.into(), self.y.into()]),
            Operation::new("l", vec![(PAGE_WIDTH - MARGIN).into(), self.y.into()]),
            Operation::new("S", vec![]),
        ]);
        self.gap(6.0);
    }

    fn banner(&mut self, title: &str, subtitle: &str) {
        let height = 90.0;
        self.fill_rect(0.0, PAGE_HEIGHT - height, PAGE_WIDTH, height, ACCENT);
        self.text_at(MARGIN, PAGE_HEIGHT - 45.0, Font::Bold, 22.0, WHITE, title);
        self.text_at(MARGIN, PAGE_HEIGHT - 70.0, Font::Regular, 13.0, WHITE, subtitle);
        self.y = PAGE_HEIGHT - height - 10.0;
    }

    fn row(&mut self, columns: &[Column], cells: &[String], font: Font, fill: Option<Rgb>, ink: Rgb) {
        self.y -= ROW_HEIGHT;
        if let Some(color) = fill {
            self.fill_rect(MARGIN, self.y, CONTENT_WIDTH, ROW_HEIGHT, color);
        }
        let baseline = self.y + (ROW_HEIGHT - BODY_SIZE) / 2.0 + 1.0;
        let mut x = MARGIN;
        for (col, cell) in columns.iter().zip(cells) {
            let tx = match col.align {
                Align::Left => x + 4.0,
                Align::Right => x + col.width - 4.0 - text_width(cell, BODY_SIZE),
            };
            self.text_at(tx, baseline, font, BODY_SIZE, ink, cell);
            x += col.width;
        }
    }

    fn header_row(&mut self, columns: &[Column]) {
        let titles: Vec<String> = columns.iter().map(|c| c.title.to_string()).collect();
        self.row(columns, &titles, Font::Bold, Some(ACCENT), WHITE);
    }

    fn table(&mut self, table: &Table) {
        self.ensure_space(2.0 * ROW_HEIGHT);
        self.header_row(&table.columns);
        for (i, cells) in table.rows.iter().enumerate() {
            if self.y - ROW_HEIGHT < MARGIN + FOOTER_Y {
                self.page_break();
                self.header_row(&table.columns);
            }
            let fill = (i % 2 == 1).then_some(STRIPE);
            self.row(&table.columns, cells, Font::Regular, fill, INK);
        }
        if let Some(total) = &table.total {
            self.ensure_space(ROW_HEIGHT);
            self.row(&table.columns, total, Font::Bold, Some(TOTAL_FILL), INK);
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.page_break();
        }
        self.pages
    }
}

fn fill_color((r, g, b): Rgb) -> Operation {
    Operation::new("rg", vec![r.into(), g.into(), b.into()])
}

fn stroke_color((r, g, b): Rgb) -> Operation {
    Operation::new("RG", vec![r.into(), g.into(), b.into()])
}

/// Characters WinAnsi places in 0x80-0x9F, where Latin-1 has control codes.
const WIN_ANSI_HIGH: &[(char, u8)] = &[
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// WinAnsiEncoding bytes; anything the encoding lacks becomes `?`.
fn encode_text(s: &str) -> Vec<u8> {
    s.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(c: char) -> u8 {
    match u32::from(c) {
        cp @ (0x20..=0x7E | 0xA0..=0xFF) => cp as u8,
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map_or(b'?', |&(_, b)| b),
    }
}

/// Approximate Helvetica advance width, good enough to right-align figures.
fn text_width(s: &str, size: f32) -> f32 {
    let units: u32 = s
        .chars()
        .map(|c| match c {
            '0'..='9' | '$' | '?' => 556,
            ' ' | ',' | '.' | '/' | ':' | 'i' | 'j' | 'l' => 278,
            '%' => 889,
            '-' | '(' | ')' | 'r' => 333,
            'f' | 't' | 'I' => 278,
            'm' | 'M' => 833,
            'w' => 722,
            'W' => 944,
            'A'..='Z' => 667,
            _ => 556,
        })
        .sum();
    units as f32 * size / 1000.0
}

fn render_err(e: impl std::fmt::Display) -> OutlayError {
    OutlayError::Render(e.to_string())
}

fn lay_out(report: &Report) -> Vec<Vec<Operation>> {
    let mut page = Layout::new();
    page.banner("Expense Report", &report.period_label);
    page.line(
        &format!("Generated for: {}", report.generated_for),
        Font::Regular,
        10.0,
    );
    page.line(
        &format!(
            "Generated on: {}",
            report.generated_at.format("%B %d, %Y at %H:%M UTC")
        ),
        Font::Regular,
        10.0,
    );

    page.heading("Executive Summary");
    page.table(&Table {
        columns: vec![
            Column { title: "Metric", width: 300.0, align: Align::Left },
            Column { title: "Value", width: CONTENT_WIDTH - 300.0, align: Align::Right },
        ],
        rows: vec![
            vec!["Total Amount".into(), fmt_money(&report.summary.total)],
            vec!["Number of Transactions".into(), report.summary.count.to_string()],
            vec!["Average Transaction".into(), fmt_money(&report.summary.average)],
        ],
        total: None,
    });

    page.heading("Spending by Category");
    if report.categories.is_empty() {
        page.line("No expenses recorded for this period.", Font::Regular, 10.0);
    }
    page.table(&Table {
        columns: vec![
            Column { title: "Category", width: 265.0, align: Align::Left },
            Column { title: "Amount", width: 130.0, align: Align::Right },
            Column { title: "% of Total", width: CONTENT_WIDTH - 395.0, align: Align::Right },
        ],
        rows: report
            .categories
            .iter()
            .map(|c| vec![c.category.clone(), fmt_money(&c.amount), fmt_percent(&c.percent)])
            .collect(),
        total: Some(vec![
            "TOTAL".into(),
            fmt_money(&report.summary.total),
            "100.0%".into(),
        ]),
    });

    page.page_break();

    page.heading("Top 10 Expenses by Amount");
    if report.top_expenses.is_empty() {
        page.line("No expenses recorded for this period.", Font::Regular, 10.0);
    } else {
        page.table(&Table {
            columns: vec![
                Column { title: "Date", width: 70.0, align: Align::Left },
                Column { title: "Expense", width: 170.0, align: Align::Left },
                Column { title: "Category", width: 170.0, align: Align::Left },
                Column { title: "Amount", width: CONTENT_WIDTH - 410.0, align: Align::Right },
            ],
            rows: report
                .top_expenses
                .iter()
                .map(|e| {
                    vec![
                        e.date.format("%Y-%m-%d").to_string(),
                        e.name.clone(),
                        e.category.clone(),
                        fmt_money(&e.amount),
                    ]
                })
                .collect(),
            total: None,
        });
    }

    if let Some(methods) = &report.payment_methods {
        page.heading("Spending by Payment Method");
        page.table(&Table {
            columns: vec![
                Column { title: "Payment Method", width: 235.0, align: Align::Left },
                Column { title: "Transactions", width: 100.0, align: Align::Right },
                Column { title: "Amount", width: CONTENT_WIDTH - 335.0, align: Align::Right },
            ],
            rows: methods
                .iter()
                .map(|m| vec![m.method.clone(), m.count.to_string(), fmt_money(&m.amount)])
                .collect(),
            total: None,
        });
    }

    page.finish()
}

pub fn render(report: &Report) -> Result<Vec<u8>> {
    let pages = lay_out(report);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            Font::Regular.resource() => regular_id,
            Font::Bold.resource() => bold_id,
        },
    });

    let page_count = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for (i, mut ops) in pages.into_iter().enumerate() {
        ops.extend(footer(i + 1, page_count));
        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(render_err)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let media_box: Vec<Object> = vec![
        0i64.into(),
        0i64.into(),
        PAGE_WIDTH.into(),
        PAGE_HEIGHT.into(),
    ];
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => media_box,
        }),
    );
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_text(&format!("Expense Report - {}", report.period_label))),
        "Author" => Object::string_literal(encode_text(&report.generated_for)),
        "Producer" => Object::string_literal("outlay"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buf = Vec::new();
    doc.save_to(&mut buf).map_err(render_err)?;
    Ok(buf)
}

fn footer(page: usize, total: usize) -> Vec<Operation> {
    let mut l = Layout::new();
    l.text_at(MARGIN, FOOTER_Y, Font::Regular, 8.0, ACCENT, "Generated by Outlay");
    let label = format!("Page {} of {}", page, total);
    let x = PAGE_WIDTH - MARGIN - text_width(&label, 8.0);
    l.text_at(x, FOOTER_Y, Font::Regular, 8.0, ACCENT, &label);
    l.ops
}
