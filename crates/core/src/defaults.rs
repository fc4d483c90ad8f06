//! Built-in seed dataset.
//!
//! Used to seed an empty remote store, as the last-resort fallback when
//! neither the remote store nor a local snapshot is available, and by the
//! reset operation.

use crate::catalog::{Catalog, collate, sort_classifications};
use crate::types::{
    Classification, ClassificationKind, Product, ProductId, SENTINEL_COLLECTION, SiteConfig,
    SocialLink,
};

/// Category names offered by a fresh install.
pub const CATEGORY_NAMES: [&str; 4] = ["Collares", "Aretes", "Pulseras", "Anillos"];

/// `(id, name, category, collection, price, description, material)`
const PRODUCTS: [(&str, &str, &str, &str, &str, &str, &str); 11] = [
    (
        "1",
        "Gargantilla Solar",
        "Collares",
        "Aurora",
        "25.00 €",
        "Una pieza central radiante con acabado dorado mate. Perfecta para escotes profundos.",
        "Aleación de zinc con baño de oro 14k",
    ),
    (
        "2",
        "Aretes Luna Creciente",
        "Aretes",
        "Nocturna",
        "15.00 €",
        "Diseño minimalista en forma de luna. Ligeros y elegantes para el uso diario.",
        "Acero inoxidable pulido",
    ),
    (
        "3",
        "Pulsera Eslabón Grueso",
        "Pulseras",
        "Aurora",
        "18.00 €",
        "Una declaración de estilo audaz. Eslabones entrelazados con cierre invisible.",
        "Latón chapado en oro",
    ),
    (
        "4",
        "Anillo Sello Botánico",
        "Anillos",
        "Orgánica",
        "12.00 €",
        "Grabado con motivos florales sutiles. Un toque vintage para manos modernas.",
        "Baño de plata envejecida",
    ),
    (
        "5",
        "Collar Perla Irregular",
        "Collares",
        "Orgánica",
        "22.00 €",
        "Cadena fina con una perla de río central de forma orgánica. Delicadeza pura.",
        "Perla de río y cadena dorada",
    ),
    (
        "6",
        "Aretes Gota de Lluvia",
        "Aretes",
        "Nocturna",
        "14.00 €",
        "Cristal facetado transparente que atrapa la luz maravillosamente.",
        "Cristal y poste hipoalergénico",
    ),
    (
        "7",
        "Brazalete Rígido Minimal",
        "Pulseras",
        "Aurora",
        "16.00 €",
        "Líneas limpias y estructura abierta. Ideal para combinar con otros brazaletes.",
        "Acero inoxidable dorado",
    ),
    (
        "8",
        "Set de Anillos Midi",
        "Anillos",
        "Nocturna",
        "10.00 €",
        "Juego de 3 anillos finos para usar en diferentes falanges.",
        "Aleación mixta plateada",
    ),
    (
        "9",
        "Collar Cascadas",
        "Collares",
        "Aurora",
        "30.00 €",
        "Múltiples capas de cadenas finas que crean un efecto de cascada elegante.",
        "Baño de oro rosa",
    ),
    (
        "10",
        "Aretes Aro Geométrico",
        "Aretes",
        "Nocturna",
        "17.00 €",
        "Una reinterpretación moderna del clásico aro con ángulos definidos.",
        "Acetato y metal",
    ),
    (
        "11",
        "Colgante Hoja Real",
        "Collares",
        "Orgánica",
        "24.00 €",
        "Una hoja real metalizada, preservando sus nervaduras naturales únicas.",
        "Baño de oro mate",
    ),
];

/// Default products, oldest first.
#[must_use]
pub fn products() -> Vec<Product> {
    PRODUCTS
        .iter()
        .filter_map(
            |&(id, name, category, collection, price, description, material)| {
                Some(Product {
                    id: ProductId::parse(id)?,
                    name: name.to_owned(),
                    category: category.to_owned(),
                    collection: collection.to_owned(),
                    price: price.to_owned(),
                    description: description.to_owned(),
                    material: material.to_owned(),
                    image_url: format!("https://picsum.photos/seed/j{id}/600/800"),
                })
            },
        )
        .collect()
}

/// Default collections, sentinel first.
#[must_use]
pub fn collections() -> Vec<Classification> {
    let mut list = vec![
        Classification::new(SENTINEL_COLLECTION, ""),
        Classification::new(
            "Aurora",
            "Inspirada en el amanecer, piezas con acabados dorados y cálidos que iluminan.",
        ),
        Classification::new(
            "Nocturna",
            "Elegancia misteriosa con tonos plateados, cristales y líneas geométricas modernas.",
        ),
        Classification::new(
            "Orgánica",
            "Conexión con la naturaleza mediante formas irregulares, perlas y texturas crudas.",
        ),
    ];
    sort_classifications(ClassificationKind::Collection, &mut list);
    list
}

#[must_use]
pub fn categories() -> Vec<Classification> {
    let mut list: Vec<Classification> = CATEGORY_NAMES
        .iter()
        .map(|name| Classification::new(*name, ""))
        .collect();
    sort_classifications(ClassificationKind::Category, &mut list);
    list
}

/// The distinct materials used by the default products.
#[must_use]
pub fn materials() -> Vec<Classification> {
    let mut names: Vec<&str> = PRODUCTS.iter().map(|p| p.6).collect();
    names.sort_by(|a, b| collate(a, b));
    names.dedup();
    names
        .into_iter()
        .map(|name| Classification::new(name, ""))
        .collect()
}

/// Default entries for one classification kind.
#[must_use]
pub fn classifications(kind: ClassificationKind) -> Vec<Classification> {
    match kind {
        ClassificationKind::Collection => collections(),
        ClassificationKind::Category => categories(),
        ClassificationKind::Material => materials(),
    }
}

#[must_use]
pub fn site_config() -> SiteConfig {
    SiteConfig {
        site_name: "Catálogo".to_owned(),
        logo_url: None,
        footer_text: "© 2024. Todos los derechos reservados.".to_owned(),
        social_links: vec![
            SocialLink::new("Instagram", "#"),
            SocialLink::new("Pinterest", "#"),
            SocialLink::new("Contacto", "mailto:hola@thebrightsoul.com"),
        ],
    }
}

/// The complete default catalog.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog {
        products: products(),
        collections: collections(),
        categories: categories(),
        materials: materials(),
        site_config: site_config(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_consistent() {
        let catalog = catalog();
        assert_eq!(catalog.products.len(), 11);
        assert_eq!(catalog.collections.len(), 4);
        assert_eq!(catalog.categories.len(), 4);
        assert_eq!(catalog.materials.len(), 11);
        assert!(catalog.dangling_references().is_empty());
    }

    #[test]
    fn test_sentinel_first() {
        assert!(collections().first().is_some_and(Classification::is_sentinel));
    }

    #[test]
    fn test_image_urls() {
        let products = products();
        assert!(
            products
                .iter()
                .all(|p| p.image_url == format!("https://picsum.photos/seed/j{}/600/800", p.id))
        );
    }
}
