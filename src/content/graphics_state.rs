//! Graphics and text state tracked while reading a content stream.

use crate::geometry::Point;

/// A 2D transformation matrix.
///
/// PDF uses matrices of the form:
/// ```text
/// [ a  b  0 ]
/// [ c  d  0 ]
/// [ e  f  1 ]
/// ```
///
/// Where (a,b,c,d) define scaling/rotation/skewing and (e,f) define translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component
    pub a: f32,
    /// Rotation/skew component
    pub b: f32,
    /// Rotation/skew component
    pub c: f32,
    /// Vertical scaling component
    pub d: f32,
    /// Horizontal translation
    pub e: f32,
    /// Vertical translation
    pub f: f32,
}

impl Matrix {
    /// Create an identity matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_spotlight::content::Matrix;
    ///
    /// let m = Matrix::identity();
    /// assert_eq!(m.a, 1.0);
    /// assert_eq!(m.d, 1.0);
    /// assert_eq!(m.e, 0.0);
    /// ```
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Create a matrix from its six components.
    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Create a translation matrix.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_spotlight::content::Matrix;
    ///
    /// let m = Matrix::translation(10.0, 20.0);
    /// assert_eq!(m.e, 10.0);
    /// assert_eq!(m.f, 20.0);
    /// ```
    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Multiply this matrix with another matrix.
    ///
    /// The result represents first applying `self`, then applying `other`.
    pub fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point using this matrix.
    pub fn transform_point(&self, x: f32, y: f32) -> Point {
        Point {
            x: self.a * x + self.c * y + self.e,
            y: self.b * x + self.d * y + self.f,
        }
    }

    /// Length of the transformed unit y vector.
    ///
    /// Used as the effective scale of the font size, which stays correct
    /// for rotated text where `d` alone would shrink.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Text state parameters plus the matrices they act on.
#[derive(Debug, Clone)]
pub struct TextState {
    /// Current transformation matrix (user space to device space)
    pub ctm: Matrix,
    /// Text matrix (Tm)
    pub text_matrix: Matrix,
    /// Text line matrix (start of the current line)
    pub text_line_matrix: Matrix,
    /// Character spacing (Tc)
    pub char_space: f32,
    /// Word spacing (Tw)
    pub word_space: f32,
    /// Horizontal scaling percentage (Tz)
    pub horizontal_scaling: f32,
    /// Text leading (TL)
    pub leading: f32,
    /// Resource name of the current font (Tf)
    pub font_name: Option<Vec<u8>>,
    /// Current font size (Tf)
    pub font_size: f32,
    /// Text rise (Ts)
    pub text_rise: f32,
}

impl TextState {
    /// Create a new text state with PDF defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_spotlight::content::TextState;
    ///
    /// let state = TextState::new();
    /// assert_eq!(state.font_size, 12.0);
    /// assert_eq!(state.horizontal_scaling, 100.0);
    /// ```
    pub fn new() -> Self {
        Self {
            ctm: Matrix::identity(),
            text_matrix: Matrix::identity(),
            text_line_matrix: Matrix::identity(),
            char_space: 0.0,
            word_space: 0.0,
            horizontal_scaling: 100.0,
            leading: 0.0,
            font_name: None,
            font_size: 12.0,
            text_rise: 0.0,
        }
    }

    /// Reset both text matrices (BT operator).
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.text_line_matrix = Matrix::identity();
    }

    /// Move to the start of the next line offset by (tx, ty) (Td operator).
    pub fn move_text_position(&mut self, tx: f32, ty: f32) {
        self.text_line_matrix = Matrix::translation(tx, ty).multiply(&self.text_line_matrix);
        self.text_matrix = self.text_line_matrix;
    }

    /// Replace both text matrices (Tm operator).
    pub fn set_text_matrix(&mut self, matrix: Matrix) {
        self.text_matrix = matrix;
        self.text_line_matrix = matrix;
    }

    /// Move to the next line using the current leading (T* operator).
    pub fn next_line(&mut self) {
        let leading = self.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Advance the text matrix horizontally by `tx` unscaled text-space units.
    pub fn advance(&mut self, tx: f32) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    /// Text rendering matrix: text space to device space for the current font.
    pub fn rendering_matrix(&self) -> Matrix {
        let params = Matrix::new(
            self.font_size * self.horizontal_scaling / 100.0,
            0.0,
            0.0,
            self.font_size,
            0.0,
            self.text_rise,
        );
        params.multiply(&self.text_matrix).multiply(&self.ctm)
    }

    /// Effective glyph height in device space.
    pub fn effective_font_size(&self) -> f32 {
        self.font_size.abs() * self.text_matrix.multiply(&self.ctm).vertical_scale()
    }
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of states for the q (save) and Q (restore) operators.
#[derive(Debug, Clone, Default)]
pub struct GraphicsStateStack {
    current: TextState,
    saved: Vec<TextState>,
}

impl GraphicsStateStack {
    /// Create a new stack holding a single default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a reference to the current state.
    pub fn current(&self) -> &TextState {
        &self.current
    }

    /// Get a mutable reference to the current state.
    pub fn current_mut(&mut self) -> &mut TextState {
        &mut self.current
    }

    /// Save the current state (q operator).
    pub fn save(&mut self) {
        self.saved.push(self.current.clone());
    }

    /// Restore the previous state (Q operator). Unbalanced restores are ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.current = state;
        }
    }
}
