//! iinuji renderings decoder.
//!
//! Projects `SCREEN … ENDSCREEN` layout instructions into screens, panels,
//! figures and events. Property values are scanned from raw terminal text by
//! small state machines, so values survive being split across terminals
//! (colors, booleans, quoted strings, points).

use std::fmt;

use serde::{Deserialize, Serialize};

use camahjucunu_bnf::{walk, AstNode, AstVisitor, Grammar, InstructionParser, VisitorContext};

use crate::error::DecodeError;
use crate::grammars::IINUJI_RENDERINGS_GRAMMAR;

/// Inlined kind identifiers recognized anywhere inside an open entity.
const KIND_CATALOG: &[&str] = &[
    "_screen",
    "_rectangle",
    "_label",
    "_horizontal_plot",
    "_input_box",
    "_buffer",
    "_update",
    "_action",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub set: bool,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Figure {
    pub kind_raw: String,
    pub type_raw: String,
    pub coords: Point,
    pub shape: Point,
    pub line_color: String,
    pub text_color: String,
    pub back_color: String,
    pub tickness: f64,
    pub capacity: Option<i64>,
    pub value: Option<String>,
    pub title_on: bool,
    pub title: String,
    pub legend_on: bool,
    pub legend: String,
    pub border: bool,
    pub triggers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Panel {
    pub kind_raw: String,
    pub coords: Point,
    pub shape: Point,
    pub z_index: u32,
    pub scale: f64,
    pub bind: String,
    pub title_on: bool,
    pub title: String,
    pub border: bool,
    pub line_color: String,
    pub text_color: String,
    pub back_color: String,
    pub tickness: f64,
    pub figures: Vec<Figure>,
}

impl Default for Panel {
    fn default() -> Self {
        Self {
            kind_raw: String::new(),
            coords: Point::default(),
            shape: Point::default(),
            z_index: 0,
            scale: 1.0,
            bind: String::new(),
            title_on: false,
            title: String::new(),
            border: false,
            line_color: String::new(),
            text_color: String::new(),
            back_color: String::new(),
            tickness: 0.0,
            figures: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBinding {
    pub local: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    pub kind_raw: String,
    pub name: String,
    pub bindings: Vec<EventBinding>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Screen {
    pub kind_raw: String,
    pub key_raw: String,
    pub fcode: i32,
    pub name: String,
    pub border: bool,
    pub line_color: String,
    pub text_color: String,
    pub back_color: String,
    pub tickness: f64,
    pub panels: Vec<Panel>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderingsInstruction {
    pub screens: Vec<Screen>,
}

fn strip_kind(raw: &str) -> &str {
    raw.strip_prefix('_').unwrap_or(raw)
}

impl Figure {
    /// Kind without the inline-identifier underscore prefix.
    pub fn kind(&self) -> &str {
        strip_kind(&self.kind_raw)
    }
}

impl Panel {
    pub fn kind(&self) -> &str {
        strip_kind(&self.kind_raw)
    }
}

impl Event {
    pub fn kind(&self) -> &str {
        strip_kind(&self.kind_raw)
    }
}

impl Screen {
    pub fn kind(&self) -> &str {
        strip_kind(&self.kind_raw)
    }
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FIGURE {}", self.kind_raw)?;
        if let Some(capacity) = self.capacity {
            write!(f, " capacity={capacity}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " value={value:?}")?;
        }
        if self.title_on {
            write!(f, " title(on,{:?})", self.title)?;
        }
        if self.legend_on {
            write!(f, " legend(on,{:?})", self.legend)?;
        }
        Ok(())
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PANEL {}", self.kind_raw)?;
        if self.title_on {
            write!(f, " title(on,{:?})", self.title)?;
        }
        for figure in &self.figures {
            write!(f, "\n  {figure}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EVENT {}", self.kind_raw)?;
        if !self.name.is_empty() {
            write!(f, " name={}", self.name)?;
        }
        if !self.bindings.is_empty() {
            let bound: Vec<String> = self
                .bindings
                .iter()
                .map(|b| format!("{}:{}", b.local, b.path))
                .collect();
            write!(f, " form{{{}}}", bound.join(","))?;
        }
        Ok(())
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SCREEN {}", self.kind_raw)?;
        if !self.key_raw.is_empty() {
            write!(f, " key={}", self.key_raw)?;
        }
        if !self.name.is_empty() {
            write!(f, " name={}", self.name)?;
        }
        for panel in &self.panels {
            write!(f, "\n  {panel}")?;
        }
        for event in &self.events {
            write!(f, "\n  {event}")?;
        }
        write!(f, "\nENDSCREEN")
    }
}

impl fmt::Display for RenderingsInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "screens: {}", self.screens.len())?;
        for screen in &self.screens {
            writeln!(f, "{screen}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sym {
    Screen,
    PanelStmt,
    FigureStmt,
    EventBlock,
    KindIdent,
    OptName,
    OptKey,
    OptLineColor,
    OptTextColor,
    OptBackColor,
    OptTickness,
    OptCoords,
    OptShape,
    OptCapacity,
    OptZIndex,
    OptScale,
    OptBind,
    OptTitle,
    OptBorder,
    OptValue,
    OptLegend,
    OptType,
    OptTriggers,
    OptForm,
}

fn sym(symbol: &str) -> Option<Sym> {
    Some(match symbol {
        "<screen>" => Sym::Screen,
        "<panel_stmt>" => Sym::PanelStmt,
        "<figure_stmt>" => Sym::FigureStmt,
        "<event_block>" => Sym::EventBlock,
        "<kind_ident>" => Sym::KindIdent,
        "<opt_name>" => Sym::OptName,
        "<opt_key>" => Sym::OptKey,
        "<opt_line_color>" => Sym::OptLineColor,
        "<opt_text_color>" => Sym::OptTextColor,
        "<opt_back_color>" => Sym::OptBackColor,
        "<opt_tickness>" => Sym::OptTickness,
        "<opt_coords>" => Sym::OptCoords,
        "<opt_shape>" => Sym::OptShape,
        "<opt__capacity>" => Sym::OptCapacity,
        "<opt_z_index>" => Sym::OptZIndex,
        "<opt_scale>" => Sym::OptScale,
        "<opt_bind>" => Sym::OptBind,
        "<opt_title>" => Sym::OptTitle,
        "<opt_border>" => Sym::OptBorder,
        "<opt_value>" => Sym::OptValue,
        "<opt_legend>" => Sym::OptLegend,
        "<opt_type>" => Sym::OptType,
        "<opt_triggers>" => Sym::OptTriggers,
        "<opt_form>" => Sym::OptForm,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Prop {
    #[default]
    None,
    Name,
    Key,
    LineColor,
    TextColor,
    BackColor,
    Tickness,
    Coords,
    Shape,
    Capacity,
    ZIndex,
    Scale,
    Bind,
    Title,
    Border,
    Value,
    Legend,
    Type,
    Triggers,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum KindTarget {
    #[default]
    None,
    Screen,
    Panel,
    Figure,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FormPhase {
    #[default]
    None,
    Local,
    Path,
}

#[derive(Default)]
struct PointCapture {
    x: i32,
    y: i32,
    parsing_y: bool,
}

#[derive(Default)]
struct RenderingsVisitor {
    screens: Vec<Screen>,

    // Everything between "/*" and "*/" terminals is suppressed; property
    // scanners read terminals loosely, so the flag must survive across them.
    in_block_comment: bool,

    in_screen: bool,
    in_panel: bool,
    in_figure: bool,
    in_event: bool,

    prop: Prop,

    expect_kind: KindTarget,
    kind_buffer: String,
    explicit_kind: bool,

    num_value: f64,
    num_frac: f64,
    num_has_dot: bool,
    int_value: u32,
    point: PointCapture,

    key_buffer: String,
    ident_buffer: String,
    string_buffer: String,
    color_in_progress: bool,
    color_digits: u8,

    bool_flag: bool,
    bool_flag_set: bool,
    word_buffer: String,

    triggers: Vec<String>,
    trigger_buffer: String,

    form_phase: FormPhase,
    form_local: String,
    form_path: String,

    dq_quote_count: u32,
    dq_escaped: bool,
    dq_current: String,
    dq_last: String,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn is_hex_char(c: char) -> bool {
    c.is_ascii_hexdigit()
}

impl RenderingsVisitor {
    fn screen(&mut self) -> Option<&mut Screen> {
        self.screens.last_mut()
    }

    fn panel(&mut self) -> Option<&mut Panel> {
        self.screens.last_mut()?.panels.last_mut()
    }

    fn figure(&mut self) -> Option<&mut Figure> {
        self.screens.last_mut()?.panels.last_mut()?.figures.last_mut()
    }

    fn event(&mut self) -> Option<&mut Event> {
        self.screens.last_mut()?.events.last_mut()
    }

    fn arm_kind(&mut self, target: KindTarget) {
        self.expect_kind = target;
        self.kind_buffer.clear();
    }

    fn clear_kind(&mut self) {
        self.expect_kind = KindTarget::None;
        self.kind_buffer.clear();
    }

    fn assign_kind(&mut self, kind: String) {
        match self.expect_kind {
            KindTarget::Screen if self.in_screen => {
                if let Some(screen) = self.screen() {
                    screen.kind_raw = kind;
                }
            }
            KindTarget::Panel if self.in_panel => {
                if let Some(panel) = self.panel() {
                    panel.kind_raw = kind;
                }
            }
            KindTarget::Figure if self.in_figure => {
                if let Some(figure) = self.figure() {
                    figure.kind_raw = kind;
                }
            }
            KindTarget::Event if self.in_event => {
                if let Some(event) = self.event() {
                    event.kind_raw = kind;
                }
            }
            _ => {}
        }
        self.clear_kind();
    }

    /// Inline kind capture: `_`-prefixed identifiers assign to the innermost
    /// armed entity; `__` property tokens flush whatever was collected.
    fn consume_kind(&mut self, lex: &str) {
        if self.expect_kind == KindTarget::None {
            return;
        }
        if lex.contains("__") {
            if !self.kind_buffer.is_empty() {
                let kind = std::mem::take(&mut self.kind_buffer);
                self.assign_kind(kind);
            } else {
                self.clear_kind();
            }
            return;
        }
        for c in lex.chars() {
            if self.kind_buffer.is_empty() {
                if c == '_' {
                    self.kind_buffer.push('_');
                }
                continue;
            }
            if is_ident_char(c) {
                self.kind_buffer.push(c);
            } else {
                if !self.kind_buffer.is_empty() {
                    let kind = std::mem::take(&mut self.kind_buffer);
                    self.assign_kind(kind);
                } else {
                    self.clear_kind();
                }
                return;
            }
        }
        if KIND_CATALOG.contains(&self.kind_buffer.as_str()) {
            let kind = std::mem::take(&mut self.kind_buffer);
            self.assign_kind(kind);
        }
    }

    fn begin_prop(&mut self, prop: Prop) {
        self.prop = prop;
        match prop {
            Prop::Name | Prop::Type | Prop::Bind => self.ident_buffer.clear(),
            Prop::Key => {
                self.key_buffer.clear();
                self.int_value = 0;
            }
            Prop::LineColor | Prop::TextColor | Prop::BackColor => self.reset_color(),
            Prop::Tickness | Prop::Capacity | Prop::Scale => {
                self.num_value = 0.0;
                self.num_frac = 0.1;
                self.num_has_dot = false;
            }
            Prop::Coords | Prop::Shape => self.point = PointCapture::default(),
            Prop::ZIndex => self.int_value = 0,
            Prop::Title | Prop::Legend => {
                self.reset_dq();
                self.reset_bool();
            }
            Prop::Value => self.reset_dq(),
            Prop::Border => self.reset_bool(),
            Prop::Triggers => {
                self.triggers.clear();
                self.trigger_buffer.clear();
            }
            Prop::Form => {
                self.form_phase = FormPhase::Local;
                self.form_local.clear();
                self.form_path.clear();
                if self.in_event {
                    if let Some(event) = self.event() {
                        event.bindings.clear();
                    }
                }
            }
            Prop::None => {}
        }
    }

    fn end_prop(&mut self) {
        self.prop = Prop::None;
    }

    fn reset_color(&mut self) {
        self.color_in_progress = false;
        self.color_digits = 0;
        self.string_buffer.clear();
    }

    fn reset_bool(&mut self) {
        self.bool_flag = false;
        self.bool_flag_set = false;
        self.word_buffer.clear();
    }

    fn reset_dq(&mut self) {
        self.dq_quote_count = 0;
        self.dq_escaped = false;
        self.dq_current.clear();
        self.dq_last.clear();
    }

    fn try_flush_bool_word(&mut self) {
        if self.bool_flag_set {
            self.word_buffer.clear();
            return;
        }
        if self.word_buffer == "true" {
            self.bool_flag = true;
            self.bool_flag_set = true;
        } else if self.word_buffer == "false" {
            self.bool_flag = false;
            self.bool_flag_set = true;
        }
        self.word_buffer.clear();
    }

    fn parse_bool_from_lex(&mut self, lex: &str) {
        if self.bool_flag_set {
            return;
        }
        for c in lex.chars() {
            if c.is_ascii_alphabetic() {
                self.word_buffer.push(c.to_ascii_lowercase());
            } else {
                self.try_flush_bool_word();
            }
        }
    }

    /// Quoted-segment capture: keeps the last non-empty segment, honoring
    /// `\"` and `\\`, across split terminals.
    fn consume_dq_segments(&mut self, lex: &str) {
        for c in lex.chars() {
            if self.dq_escaped {
                if self.dq_quote_count % 2 == 1 {
                    self.dq_current.push(c);
                }
                self.dq_escaped = false;
                continue;
            }
            if c == '\\' {
                self.dq_escaped = true;
                continue;
            }
            if c == '"' {
                self.dq_quote_count += 1;
                if self.dq_quote_count % 2 == 0 {
                    if !self.dq_current.is_empty() {
                        self.dq_last = std::mem::take(&mut self.dq_current);
                    } else {
                        self.dq_current.clear();
                    }
                }
                continue;
            }
            if self.dq_quote_count % 2 == 1 {
                self.dq_current.push(c);
            }
        }
    }

    fn dq_final(&self) -> String {
        if !self.dq_last.is_empty() {
            self.dq_last.clone()
        } else {
            self.dq_current.clone()
        }
    }

    fn consume_color_hex(&mut self, lex: &str) {
        for c in lex.chars() {
            if c == '#' {
                self.string_buffer.clear();
                self.string_buffer.push('#');
                self.color_in_progress = true;
                self.color_digits = 0;
                continue;
            }
            if self.color_in_progress && is_hex_char(c) {
                if self.color_digits < 6 {
                    self.string_buffer.push(c);
                    self.color_digits += 1;
                }
                if self.color_digits >= 6 {
                    self.color_in_progress = false;
                }
            }
        }
    }

    fn consume_point(&mut self, lex: &str) {
        for c in lex.chars() {
            if c.is_ascii_digit() {
                let digit = (c as u8 - b'0') as i32;
                if self.point.parsing_y {
                    self.point.y = self.point.y * 10 + digit;
                } else {
                    self.point.x = self.point.x * 10 + digit;
                }
            } else if c == ',' {
                self.point.parsing_y = true;
            }
        }
    }

    fn consume_uint(&mut self, lex: &str) {
        for c in lex.chars() {
            if c.is_ascii_digit() {
                self.int_value = self.int_value * 10 + (c as u8 - b'0') as u32;
            }
        }
    }

    fn consume_float(&mut self, lex: &str) {
        for c in lex.chars() {
            if c.is_ascii_digit() {
                let digit = (c as u8 - b'0') as f64;
                if self.num_has_dot {
                    self.num_value += digit * self.num_frac;
                    self.num_frac *= 0.1;
                } else {
                    self.num_value = self.num_value * 10.0 + digit;
                }
            } else if c == '.' && !self.num_has_dot {
                self.num_has_dot = true;
            }
        }
    }

    fn consume_ident(&mut self, lex: &str, tag: &str) {
        let mut rest = lex;
        if let Some(pos) = lex.find(tag) {
            rest = &lex[pos + tag.len()..];
        }
        let filtered: String = rest.chars().filter(|&c| is_ident_char(c)).collect();
        self.ident_buffer.push_str(&filtered);
    }

    fn flush_form_binding_if_complete(&mut self) {
        if !self.in_event || self.form_local.is_empty() || self.form_path.is_empty() {
            return;
        }
        let binding = EventBinding {
            local: std::mem::take(&mut self.form_local),
            path: format!(".{}", std::mem::take(&mut self.form_path)),
        };
        if let Some(event) = self.event() {
            event.bindings.push(binding);
        }
        self.form_phase = FormPhase::Local;
    }

    fn commit_color(&mut self, which: Sym) {
        if self.string_buffer.is_empty() {
            return;
        }
        let color = self.string_buffer.clone();
        let slot = if self.in_figure {
            self.figure().map(|f| match which {
                Sym::OptLineColor => &mut f.line_color,
                Sym::OptBackColor => &mut f.back_color,
                _ => &mut f.text_color,
            })
        } else if self.in_panel {
            self.panel().map(|p| match which {
                Sym::OptLineColor => &mut p.line_color,
                Sym::OptBackColor => &mut p.back_color,
                _ => &mut p.text_color,
            })
        } else if self.in_screen {
            self.screen().map(|s| match which {
                Sym::OptLineColor => &mut s.line_color,
                Sym::OptBackColor => &mut s.back_color,
                _ => &mut s.text_color,
            })
        } else {
            None
        };
        if let Some(slot) = slot {
            *slot = color;
        }
        self.reset_color();
    }
}

impl AstVisitor for RenderingsVisitor {
    fn enter(&mut self, node: &AstNode, _ctx: &VisitorContext<'_>) {
        if let AstNode::Terminal { .. } = node {
            self.terminal(node);
            return;
        }
        let Some(sym) = sym(node.symbol()) else {
            return;
        };
        match sym {
            Sym::Screen => {
                self.screens.push(Screen::default());
                self.in_screen = true;
                self.in_panel = false;
                self.in_figure = false;
                self.in_event = false;
                self.arm_kind(KindTarget::Screen);
            }
            Sym::PanelStmt => {
                if let Some(screen) = self.screen() {
                    screen.panels.push(Panel::default());
                }
                self.in_panel = true;
                self.in_figure = false;
                self.arm_kind(KindTarget::Panel);
            }
            Sym::FigureStmt => {
                if let Some(panel) = self.panel() {
                    panel.figures.push(Figure::default());
                }
                self.in_figure = true;
                self.arm_kind(KindTarget::Figure);
            }
            Sym::EventBlock => {
                if let Some(screen) = self.screen() {
                    screen.events.push(Event::default());
                }
                self.in_event = true;
                self.arm_kind(KindTarget::Event);
            }
            Sym::KindIdent => {
                self.explicit_kind = true;
                self.kind_buffer.clear();
            }
            Sym::OptName => self.begin_prop(Prop::Name),
            Sym::OptKey => self.begin_prop(Prop::Key),
            Sym::OptLineColor => self.begin_prop(Prop::LineColor),
            Sym::OptTextColor => self.begin_prop(Prop::TextColor),
            Sym::OptBackColor => self.begin_prop(Prop::BackColor),
            Sym::OptTickness => self.begin_prop(Prop::Tickness),
            Sym::OptCoords => self.begin_prop(Prop::Coords),
            Sym::OptShape => self.begin_prop(Prop::Shape),
            Sym::OptCapacity => self.begin_prop(Prop::Capacity),
            Sym::OptZIndex => self.begin_prop(Prop::ZIndex),
            Sym::OptScale => self.begin_prop(Prop::Scale),
            Sym::OptBind => self.begin_prop(Prop::Bind),
            Sym::OptTitle => self.begin_prop(Prop::Title),
            Sym::OptBorder => self.begin_prop(Prop::Border),
            Sym::OptValue => self.begin_prop(Prop::Value),
            Sym::OptLegend => self.begin_prop(Prop::Legend),
            Sym::OptType => self.begin_prop(Prop::Type),
            Sym::OptTriggers => self.begin_prop(Prop::Triggers),
            Sym::OptForm => self.begin_prop(Prop::Form),
        }
    }

    fn exit(&mut self, node: &AstNode, _ctx: &VisitorContext<'_>) {
        if matches!(node, AstNode::Terminal { .. }) {
            return;
        }
        let Some(sym) = sym(node.symbol()) else {
            return;
        };
        match sym {
            Sym::Screen => {
                self.in_screen = false;
                self.clear_kind();
            }
            Sym::PanelStmt => {
                self.in_panel = false;
                self.in_figure = false;
                self.clear_kind();
            }
            Sym::FigureStmt => {
                self.in_figure = false;
                self.clear_kind();
            }
            Sym::EventBlock => {
                self.in_event = false;
                self.clear_kind();
            }
            Sym::KindIdent => {
                self.explicit_kind = false;
                if !self.kind_buffer.is_empty() {
                    let kind = std::mem::take(&mut self.kind_buffer);
                    self.assign_kind(kind);
                }
            }
            Sym::OptName => {
                if !self.ident_buffer.is_empty() {
                    let name = self.ident_buffer.clone();
                    if self.in_event {
                        if let Some(event) = self.event() {
                            event.name = name;
                        }
                    } else if self.in_screen && !self.in_panel && !self.in_figure {
                        if let Some(screen) = self.screen() {
                            screen.name = name;
                        }
                    }
                }
                self.ident_buffer.clear();
                self.end_prop();
            }
            Sym::OptKey => {
                if self.in_screen && !self.in_panel && !self.in_event && !self.in_figure {
                    let key = self.key_buffer.clone();
                    let fcode = self.int_value as i32;
                    if let Some(screen) = self.screen() {
                        screen.key_raw = key;
                        screen.fcode = fcode;
                    }
                }
                self.end_prop();
            }
            Sym::OptLineColor | Sym::OptTextColor | Sym::OptBackColor => {
                self.commit_color(sym);
                self.end_prop();
            }
            Sym::OptTickness => {
                let value = self.num_value;
                if self.in_figure {
                    if let Some(figure) = self.figure() {
                        figure.tickness = value;
                    }
                } else if self.in_panel {
                    if let Some(panel) = self.panel() {
                        panel.tickness = value;
                    }
                } else if self.in_screen {
                    if let Some(screen) = self.screen() {
                        screen.tickness = value;
                    }
                }
                self.end_prop();
            }
            Sym::OptCoords => {
                let point = Point {
                    set: true,
                    x: self.point.x,
                    y: self.point.y,
                };
                if self.in_figure {
                    if let Some(figure) = self.figure() {
                        figure.coords = point;
                    }
                } else if self.in_panel {
                    if let Some(panel) = self.panel() {
                        panel.coords = point;
                    }
                }
                self.end_prop();
            }
            Sym::OptShape => {
                let point = Point {
                    set: true,
                    x: self.point.x,
                    y: self.point.y,
                };
                if self.in_figure {
                    if let Some(figure) = self.figure() {
                        figure.shape = point;
                    }
                } else if self.in_panel {
                    if let Some(panel) = self.panel() {
                        panel.shape = point;
                    }
                }
                self.end_prop();
            }
            Sym::OptCapacity => {
                // figure-only
                if self.in_figure {
                    let capacity = if self.num_value > 0.0 {
                        self.num_value as i64
                    } else {
                        0
                    };
                    if let Some(figure) = self.figure() {
                        figure.capacity = Some(capacity);
                    }
                }
                self.end_prop();
            }
            Sym::OptZIndex => {
                let z = self.int_value;
                if self.in_panel {
                    if let Some(panel) = self.panel() {
                        panel.z_index = z;
                    }
                }
                self.end_prop();
            }
            Sym::OptScale => {
                let scale = self.num_value;
                if self.in_panel {
                    if let Some(panel) = self.panel() {
                        panel.scale = scale;
                    }
                }
                self.end_prop();
            }
            Sym::OptBind => {
                let bind = self.ident_buffer.clone();
                if self.in_panel {
                    if let Some(panel) = self.panel() {
                        panel.bind = bind;
                    }
                }
                self.ident_buffer.clear();
                self.end_prop();
            }
            Sym::OptTitle => {
                self.try_flush_bool_word();
                let text = self.dq_final();
                let on = self.bool_flag;
                if self.in_figure {
                    if let Some(figure) = self.figure() {
                        figure.title_on = on;
                        figure.title = text;
                    }
                } else if self.in_panel {
                    if let Some(panel) = self.panel() {
                        panel.title_on = on;
                        panel.title = text;
                    }
                }
                self.reset_dq();
                self.reset_bool();
                self.end_prop();
            }
            Sym::OptBorder => {
                self.try_flush_bool_word();
                let on = self.bool_flag;
                if self.in_figure {
                    if let Some(figure) = self.figure() {
                        figure.border = on;
                    }
                } else if self.in_panel {
                    if let Some(panel) = self.panel() {
                        panel.border = on;
                    }
                } else if self.in_screen {
                    if let Some(screen) = self.screen() {
                        screen.border = on;
                    }
                }
                self.reset_bool();
                self.end_prop();
            }
            Sym::OptValue => {
                let text = self.dq_final();
                if self.in_figure {
                    if let Some(figure) = self.figure() {
                        figure.value = Some(text);
                    }
                }
                self.reset_dq();
                self.end_prop();
            }
            Sym::OptLegend => {
                self.try_flush_bool_word();
                let text = self.dq_final();
                let on = self.bool_flag;
                if self.in_figure {
                    if let Some(figure) = self.figure() {
                        figure.legend_on = on;
                        figure.legend = text;
                    }
                }
                self.reset_dq();
                self.reset_bool();
                self.end_prop();
            }
            Sym::OptType => {
                if self.in_figure {
                    let type_raw = self.ident_buffer.clone();
                    if let Some(figure) = self.figure() {
                        figure.type_raw = type_raw;
                    }
                }
                self.ident_buffer.clear();
                self.end_prop();
            }
            Sym::OptTriggers => {
                if self.in_figure {
                    if !self.trigger_buffer.is_empty() {
                        let trigger = std::mem::take(&mut self.trigger_buffer);
                        self.triggers.push(trigger);
                    }
                    let triggers = std::mem::take(&mut self.triggers);
                    if let Some(figure) = self.figure() {
                        figure.triggers = triggers;
                    }
                }
                self.triggers.clear();
                self.trigger_buffer.clear();
                self.end_prop();
            }
            Sym::OptForm => {
                self.flush_form_binding_if_complete();
                self.form_phase = FormPhase::None;
                self.end_prop();
            }
            _ => {}
        }
    }
}

impl RenderingsVisitor {
    fn terminal(&mut self, node: &AstNode) {
        let lex = node.matched_text();
        if lex.is_empty() {
            return;
        }

        if self.in_block_comment {
            if lex == "*/" {
                self.in_block_comment = false;
            }
            return;
        }
        if lex == "/*" {
            self.in_block_comment = true;
            return;
        }
        if lex == "*/" {
            return;
        }

        if self.explicit_kind {
            for c in lex.chars() {
                if is_ident_char(c) {
                    self.kind_buffer.push(c);
                }
            }
        } else {
            self.consume_kind(&lex);
        }

        match self.prop {
            Prop::Name => self.consume_ident(&lex, "__name"),
            Prop::Type => self.consume_ident(&lex, "__type"),
            Prop::Bind => self.consume_ident(&lex, "bind"),
            Prop::Key => {
                for c in lex.chars() {
                    if c == 'F' || c == '+' {
                        self.key_buffer.push(c);
                    } else if c.is_ascii_digit() {
                        self.key_buffer.push(c);
                        self.int_value = self.int_value * 10 + (c as u8 - b'0') as u32;
                    }
                }
            }
            Prop::LineColor | Prop::TextColor | Prop::BackColor => self.consume_color_hex(&lex),
            Prop::Tickness | Prop::Capacity | Prop::Scale => self.consume_float(&lex),
            Prop::Coords | Prop::Shape => self.consume_point(&lex),
            Prop::ZIndex => self.consume_uint(&lex),
            Prop::Title | Prop::Legend => {
                self.parse_bool_from_lex(&lex);
                self.consume_dq_segments(&lex);
            }
            Prop::Value => self.consume_dq_segments(&lex),
            Prop::Border => self.parse_bool_from_lex(&lex),
            Prop::Triggers => {
                let mut rest = lex.as_str();
                if let Some(pos) = rest.find("__triggers") {
                    rest = &rest[pos + "__triggers".len()..];
                }
                for c in rest.chars() {
                    if is_ident_char(c) {
                        self.trigger_buffer.push(c);
                    } else if c == ',' && !self.trigger_buffer.is_empty() {
                        let trigger = std::mem::take(&mut self.trigger_buffer);
                        self.triggers.push(trigger);
                    }
                }
            }
            Prop::Form => {
                let mut rest = lex.as_str();
                if let Some(pos) = rest.find("__form") {
                    rest = &rest[pos + "__form".len()..];
                }
                for c in rest.chars() {
                    if c == ':' {
                        self.form_phase = FormPhase::Path;
                    } else if c == '.' {
                        // dots are dropped from paths; the consumer resolves
                        // either spelling
                    } else if c == ',' {
                        self.flush_form_binding_if_complete();
                    } else if is_ident_char(c) {
                        match self.form_phase {
                            FormPhase::Local => self.form_local.push(c),
                            FormPhase::Path => self.form_path.push(c),
                            FormPhase::None => {}
                        }
                    }
                }
            }
            Prop::None => {}
        }
    }
}

/// Grammar-driven decoder for rendering instructions.
pub struct RenderingsPipeline {
    grammar: Grammar,
}

impl RenderingsPipeline {
    pub fn new() -> Result<Self, DecodeError> {
        Self::with_grammar(IINUJI_RENDERINGS_GRAMMAR)
    }

    pub fn with_grammar(grammar_text: &str) -> Result<Self, DecodeError> {
        let grammar = Grammar::parse(grammar_text)?;
        grammar.verify()?;
        Ok(Self { grammar })
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn decode(&self, instruction: &str) -> Result<RenderingsInstruction, DecodeError> {
        let root = InstructionParser::new(&self.grammar).parse_instruction(instruction)?;
        let mut visitor = RenderingsVisitor::default();
        walk(&root, &mut visitor);
        Ok(RenderingsInstruction {
            screens: visitor.screens,
        })
    }
}
