mod cart;
mod facet_list;
mod product_detail;
mod product_list;
mod stats;

pub use cart::{CartLine, CartView};
pub use facet_list::{Facet, FacetListView};
pub use product_detail::ProductDetailView;
pub use product_list::ProductListView;
pub use stats::StatsView;
