//! WASM bindings for the pagination engine
//!
//! Pages cross the bridge as JSON strings. Chapter start pages go out as a
//! flat `Uint32Array` of `[chapter, page, chapter, page, ...]` pairs.

use crate::layout::RenderedBook;
use crate::{Book, LayoutError};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(err: LayoutError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-exposed book wrapper
#[wasm_bindgen]
pub struct WasmBook {
    book: Book,
    rendered: Option<RenderedBook>,
}

#[wasm_bindgen]
impl WasmBook {
    /// Create a book from project and theme JSON
    #[wasm_bindgen(constructor)]
    pub fn new(project_json: &str, theme_json: &str) -> Result<WasmBook, JsValue> {
        let book = Book::from_json(project_json, theme_json).map_err(js_error)?;
        Ok(Self {
            book,
            rendered: None,
        })
    }

    /// Paginate and render the whole book; returns the page count
    pub fn generate(&mut self) -> Result<usize, JsValue> {
        let rendered = self.book.generate().map_err(js_error)?;
        let count = rendered.page_count();
        self.rendered = Some(rendered);
        Ok(count)
    }

    /// Page count of the last generation, 0 before the first one
    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.rendered.as_ref().map_or(0, RenderedBook::page_count)
    }

    /// Display list of one page as JSON
    #[wasm_bindgen(js_name = pageJson)]
    pub fn page_json(&self, index: usize) -> Result<String, JsValue> {
        let rendered = self
            .rendered
            .as_ref()
            .ok_or_else(|| JsValue::from_str("book has not been generated"))?;
        let page = rendered.page(index).map_err(js_error)?;
        serde_json::to_string(page).map_err(|err| js_error(err.into()))
    }

    /// Flat `[chapter, page]` pairs in chapter order
    #[wasm_bindgen(js_name = chapterStartPages)]
    pub fn chapter_start_pages(&self) -> js_sys::Uint32Array {
        let flat = self.start_pages_flat();
        js_sys::Uint32Array::from(flat.as_slice())
    }

    /// Generated table-of-contents body, if any
    #[wasm_bindgen(js_name = tableOfContents)]
    pub fn table_of_contents(&self) -> Option<String> {
        self.rendered
            .as_ref()
            .and_then(|r| r.table_of_contents())
            .map(str::to_string)
    }
}

impl WasmBook {
    fn start_pages_flat(&self) -> Vec<u32> {
        let Some(rendered) = &self.rendered else {
            return Vec::new();
        };
        rendered
            .chapter_start_pages()
            .sorted()
            .into_iter()
            .flat_map(|(id, page)| [id.0 as u32, page])
            .collect()
    }
}
