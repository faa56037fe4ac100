//! Declarative page layout for the inspection worksheet.
//!
//! Every element is placed relative to a [`Grid`] anchor; there are no
//! absolute coordinates outside the grid. Coordinates are PDF points with the
//! origin at the top-left corner of the page, y growing downwards.

use lazy_static::lazy_static;

/// Ruled lines sit this far below their row anchor.
pub const LINE_DROP: f32 = 10.0;
/// Horizontal dashed separators sit this far below their row anchor.
pub const SEPARATOR_DROP: f32 = 5.0;

/// US Letter.
pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

pub const HEADER: &str = "header";
pub const IDENTITY: &str = "identity";
pub const PROPERTY_FACTS: &str = "property facts";
pub const INTERIOR: &str = "interior";
pub const CHECKS: &str = "checks";
pub const OUTDOORS: &str = "outdoors";
pub const STRUCTURAL_SYSTEMS: &str = "structural systems";
pub const LIKES_DISLIKES: &str = "likes / dislikes";
pub const WORK_NEEDED: &str = "work needed";
pub const NOTES: &str = "notes";

const STRUCTURAL: [&str; 7] = [
    "Windows: ",
    "Roof: ",
    "Furnace: ",
    "Insulation: ",
    "Electrical: ",
    "Foundation: ",
    "Water Heater: ",
];

const YES_NO: &str = "( Y / N )";

/// Arithmetic progression of column and row anchors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub col_origin: f32,
    pub col_pitch: f32,
    pub row_origin: f32,
    pub row_pitch: f32,
}

impl Grid {
    /// A quarter of 180pt between columns, 30pt between rows.
    pub const WORKSHEET: Grid = Grid {
        col_origin: 20.0,
        col_pitch: 180.0 / 4.0,
        row_origin: 35.0,
        row_pitch: 30.0,
    };

    pub fn col(&self, i: u8) -> f32 {
        self.col_origin + self.col_pitch * f32::from(i)
    }

    pub fn row(&self, j: u8) -> f32 {
        self.row_origin + self.row_pitch * f32::from(j)
    }

    pub fn resolve(&self, at: Anchor) -> (f32, f32) {
        (self.col(at.col) + at.dx, self.row(at.row) + at.dy)
    }
}

/// A grid cell plus an offset in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub col: u8,
    pub row: u8,
    pub dx: f32,
    pub dy: f32,
}

pub fn at(col: u8, row: u8) -> Anchor {
    Anchor {
        col,
        row,
        dx: 0.0,
        dy: 0.0,
    }
}

impl Anchor {
    pub fn dx(self, dx: f32) -> Self {
        Anchor { dx: self.dx + dx, ..self }
    }

    pub fn dy(self, dy: f32) -> Self {
        Anchor { dy: self.dy + dy, ..self }
    }
}

/// Record values a text instruction can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    City,
    Address,
    BuildYear,
    Sqft,
    LotSize,
    Beds,
    Baths,
    GarageSpaces,
    Price,
    Identifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Literal(&'static str),
    Field(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Label,
    Body,
    Price,
    Identifier,
}

/// Images resolved once per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    ListingPhoto,
    ListingSymbol,
    MapSymbol,
    Icon,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Label { at: Anchor, text: &'static str },
    Text { at: Anchor, content: Content, style: TextStyle },
    Line { at: Anchor, width: f32 },
    Separator { at: Anchor, length: f32, orientation: Orientation },
    /// White rounded rectangle painted under an image or headline.
    Backdrop { at: Anchor, width: f32, height: f32, bleed: f32 },
    Image { at: Anchor, size: f32, slot: Slot },
    StarRow { at: Anchor, count: u8 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: &'static str,
    pub instructions: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    pub width: f32,
    pub height: f32,
    pub grid: Grid,
    pub pages: Vec<Page>,
}

impl LayoutPlan {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[cfg(test)]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.pages
            .iter()
            .flat_map(|p| p.sections.iter())
            .find(|s| s.name == name)
    }

    /// The two-page house-inspection worksheet.
    pub fn worksheet() -> &'static LayoutPlan {
        &WORKSHEET
    }
}

lazy_static! {
    static ref WORKSHEET: LayoutPlan = LayoutPlan {
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        grid: Grid::WORKSHEET,
        pages: vec![
            Page {
                sections: vec![
                    header(),
                    identity(),
                    property_facts(),
                    interior(),
                    checks(),
                    outdoors(),
                    structural_systems(),
                ],
            },
            Page {
                sections: vec![likes_dislikes(), work_needed(), notes()],
            },
        ],
    };
}

struct SectionBuilder {
    name: &'static str,
    instructions: Vec<Instruction>,
}

impl SectionBuilder {
    fn new(name: &'static str) -> Self {
        SectionBuilder {
            name,
            instructions: Vec::new(),
        }
    }

    fn push(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    fn label(self, at: Anchor, text: &'static str) -> Self {
        self.push(Instruction::Label { at, text })
    }

    fn text(self, at: Anchor, text: &'static str) -> Self {
        self.push(Instruction::Text {
            at,
            content: Content::Literal(text),
            style: TextStyle::Body,
        })
    }

    fn value(self, at: Anchor, field: Field) -> Self {
        self.push(Instruction::Text {
            at,
            content: Content::Field(field),
            style: TextStyle::Body,
        })
    }

    /// Writing line under row `at`.
    fn line(self, at: Anchor, width: f32) -> Self {
        self.push(Instruction::Line {
            at: at.dy(LINE_DROP),
            width,
        })
    }

    fn rule(self, at: Anchor, length: f32) -> Self {
        self.push(Instruction::Separator {
            at: at.dy(SEPARATOR_DROP),
            length,
            orientation: Orientation::Horizontal,
        })
    }

    fn column_rule(self, at: Anchor, length: f32) -> Self {
        self.push(Instruction::Separator {
            at,
            length,
            orientation: Orientation::Vertical,
        })
    }

    /// Image on a white backdrop. The image overhangs the backdrop by `overhang`.
    fn framed_image(self, at: Anchor, size: f32, overhang: f32, bleed: f32, slot: Slot) -> Self {
        self.push(Instruction::Backdrop {
            at,
            width: size,
            height: size,
            bleed,
        })
        .push(Instruction::Image {
            at: at.dx(-overhang).dy(-overhang),
            size: size + overhang,
            slot,
        })
    }

    fn headline(self, at: Anchor, width: f32, bleed: f32, field: Field, style: TextStyle) -> Self {
        self.push(Instruction::Backdrop {
            at,
            width,
            height: 10.0,
            bleed,
        })
        .push(Instruction::Text {
            at,
            content: Content::Field(field),
            style,
        })
    }

    /// Label, a yes/no prompt, a second label and a line to write on.
    fn choice_row(self, row: u8, label: &'static str, detail: &'static str) -> Self {
        self.label(at(0, row), label)
            .text(at(1, row).dx(40.0), YES_NO)
            .label(at(2, row).dx(40.0), detail)
            .line(at(3, row).dx(30.0), 85.0)
    }

    /// `count` writing lines on consecutive rows starting at `first`.
    fn ruled(mut self, first: u8, count: u8, starts: &[(Anchor, f32)]) -> Self {
        for row in first..first + count {
            for &(start, width) in starts {
                self = self.line(Anchor { row, ..start }, width);
            }
        }
        self
    }

    fn build(self) -> Section {
        Section {
            name: self.name,
            instructions: self.instructions,
        }
    }
}

fn header() -> Section {
    SectionBuilder::new(HEADER)
        .push(Instruction::Image {
            at: at(8, 0).dx(5.0).dy(-10.0),
            size: 200.0,
            slot: Slot::ListingPhoto,
        })
        .framed_image(at(11, 4).dx(5.0).dy(5.0), 75.0, 10.0, 28.0, Slot::ListingSymbol)
        .framed_image(at(6, 0).dx(10.0).dy(5.0), 75.0, 10.0, 18.0, Slot::MapSymbol)
        .framed_image(at(6, 0).dx(32.0).dy(25.0), 20.0, 0.0, 5.0, Slot::Icon)
        .headline(at(8, 6).dy(5.0), 85.0, 28.0, Field::Price, TextStyle::Price)
        .headline(at(11, 0).dx(35.0).dy(-15.0), 50.0, 10.0, Field::Identifier, TextStyle::Identifier)
        .build()
}

fn identity() -> Section {
    SectionBuilder::new(IDENTITY)
        .label(at(0, 0), "Date: ")
        .line(at(0, 0).dx(40.0), 100.0)
        .label(at(3, 0).dx(10.0), "City: ")
        .line(at(4, 0), 80.0)
        .value(at(4, 0), Field::City)
        .label(at(0, 1), "Address: ")
        .line(at(0, 1).dx(60.0), 200.0)
        .value(at(2, 1), Field::Address)
        .line(at(0, 2).dx(60.0), 200.0)
        .label(at(0, 3), "Star Rating: ")
        .push(Instruction::StarRow {
            at: at(0, 3).dx(50.0).dy(-3.0),
            count: 5,
        })
        .label(at(4, 3), "Num Rating (1-7): ")
        .line(at(5, 3).dx(50.0), 30.0)
        .rule(at(0, 4), 330.0)
        .build()
}

fn property_facts() -> Section {
    SectionBuilder::new(PROPERTY_FACTS)
        .label(at(0, 5), "Build Year: ")
        .line(at(0, 5).dx(65.0), 50.0)
        .value(at(1, 5).dx(30.0), Field::BuildYear)
        .label(at(3, 5), "Sqft: ")
        .line(at(3, 5).dx(25.0), 50.0)
        .value(at(4, 5), Field::Sqft)
        .label(at(5, 5), "Lot Size: ")
        .line(at(5, 5).dx(55.0), 40.0)
        .value(at(6, 5).dx(10.0), Field::LotSize)
        .label(at(0, 6), "# Beds: ")
        .line(at(0, 6).dx(40.0), 50.0)
        .value(at(1, 6), Field::Beds)
        .label(at(2, 6).dx(5.0), "# Baths: ")
        .line(at(2, 6).dx(50.0), 50.0)
        .value(at(3, 6).dx(10.0), Field::Baths)
        .label(at(4, 6).dx(15.0), "# Garage Spaces: ")
        .line(at(4, 6).dx(105.0), 35.0)
        .value(at(6, 6).dx(20.0), Field::GarageSpaces)
        .text(at(2, 7).dx(5.0).dy(-10.0), "+         1/2          3/4")
        .rule(at(0, 7), 570.0)
        .column_rule(at(6, 7).dx(20.0).dy(LINE_DROP), 530.0)
        .build()
}

fn interior() -> Section {
    SectionBuilder::new(INTERIOR)
        .label(at(0, 8), "Basement: ")
        .text(at(1, 8).dx(12.0), "( Finished / Unfinished / Partial )")
        .line(at(3, 8).dx(55.0), 60.0)
        .choice_row(9, "AC: ", "Type: ")
        .choice_row(10, "Fireplace: ", "Type: ")
        .choice_row(11, "Dishwasher: ", "Notes: ")
        .choice_row(12, "Enclosed Porch: ", "Type: ")
        .rule(at(0, 13), 280.0)
        .build()
}

fn checks() -> Section {
    SectionBuilder::new(CHECKS)
        .label(at(0, 14), "Faulty Outlets: ")
        .text(at(1, 14).dx(40.0), YES_NO)
        .label(at(2, 14).dx(40.0), "# ")
        .line(at(3, 14).dx(5.0), 50.0)
        .label(at(0, 15), "Wall Moisture (%): ")
        .text(at(0, 16), "Basement: ")
        .line(at(1, 16).dx(5.0), 30.0)
        .text(at(2, 16), "Main: ")
        .line(at(2, 16).dx(35.0), 30.0)
        .text(at(3, 16).dx(25.0), "Bathroom: ")
        .line(at(4, 16).dx(30.0), 30.0)
        .label(at(0, 17), "Temps (F): ")
        .text(at(0, 18), "Basement: ")
        .line(at(1, 18).dx(5.0), 70.0)
        .text(at(3, 18), "Main: ")
        .line(at(3, 18).dx(35.0), 70.0)
        .build()
}

fn outdoors() -> Section {
    SectionBuilder::new(OUTDOORS)
        .label(at(7, 8), "Garage: ")
        .text(at(7, 9), "Project Space: ")
        .text(at(8, 9).dx(15.0), YES_NO)
        .line(at(9, 9).dx(10.0), 60.0)
        .label(at(7, 10), "Yard: ")
        .text(at(7, 11), "Trees: ")
        .line(at(7, 11).dx(30.0), 30.0)
        .text(at(8, 11).dx(20.0), "Garden Space: ")
        .text(at(9, 11).dx(35.0), YES_NO)
        .text(at(10, 11).dx(30.0), "Shed: ")
        .text(at(10, 11).dx(60.0), YES_NO)
        .label(at(7, 12), "Neighborhood: ")
        .text(at(7, 13), "Parks: ")
        .line(at(7, 13).dx(30.0), 80.0)
        .text(at(9, 13).dx(25.0), "Transit: ")
        .line(at(10, 13).dx(15.0), 95.0)
        .text(at(7, 14), "Commute: ")
        .text(at(8, 14), "(A): ")
        .line(at(8, 14).dx(25.0), 65.0)
        .text(at(10, 14).dx(10.0), "(B): ")
        .line(at(10, 14).dx(25.0), 85.0)
        .rule(at(6, 15).dx(30.0), 280.0)
        .build()
}

fn structural_systems() -> Section {
    let mut section = SectionBuilder::new(STRUCTURAL_SYSTEMS);
    for (row, name) in (16u8..).zip(STRUCTURAL) {
        section = section
            .label(at(6, row).dx(25.0).dy(-2.0), name)
            .text(at(8, row).dx(10.0), "Condition: ")
            .line(at(9, row).dx(10.0), 45.0)
            .text(at(10, row).dx(15.0), "Notes: ")
            .line(at(11, row), 70.0);
    }
    section.build()
}

fn likes_dislikes() -> Section {
    SectionBuilder::new(LIKES_DISLIKES)
        .column_rule(at(6, 0).dx(20.0).dy(-30.0), 230.0)
        .label(at(2, 0).dx(30.0), "Likes: ")
        .label(at(9, 0).dx(10.0), "Dislikes: ")
        .ruled(1, 6, &[(at(0, 0), 270.0), (at(6, 0).dx(35.0), 270.0)])
        .build()
}

fn work_needed() -> Section {
    SectionBuilder::new(WORK_NEEDED)
        .label(at(5, 8).dx(30.0), "Work Needed: ")
        .ruled(9, 8, &[(at(0, 0), 570.0)])
        .build()
}

fn notes() -> Section {
    SectionBuilder::new(NOTES)
        .label(at(5, 18).dx(30.0), "Notes: ")
        .ruled(19, 6, &[(at(0, 0), 570.0)])
        .build()
}
