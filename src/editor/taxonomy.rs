//! Fixed classification of pipeline steps: category name to type labels.

/// Category table in display order.
const TABLE: &[(&str, &[&str])] = &[
	("Filtros", &["Pasa banda", "Pasa bajo", "Pasa alto", "CAR"]),
	(
		"Preprocesamiento",
		&[
			"Normalizar",
			"Extraer trials",
			"Trocear señales",
			"Seleccionar eventos",
			"Seleccionar canales",
			"Extraer ERP",
		],
	),
	(
		"Extracción de características",
		&[
			"Estadística",
			"Hjorth",
			"Transformada de Fourier",
			"Densidad espectral de potencia",
			"Wavelets",
			"Autoencoder",
		],
	),
	("Clasificadores", &["LDA", "KNN", "SVM", "Red neuronal"]),
	(
		"Validación",
		&["K-fold cross validation", "Hold out validation"],
	),
	("Datos", &["Data JSON", "Data CSV"]),
];

/// Categories with their type labels, in declaration order.
pub fn categories() -> impl Iterator<Item = (&'static str, &'static [&'static str])> {
	TABLE.iter().copied()
}

/// Category owning `kind`, if any category lists it.
pub fn reverse_lookup(kind: &str) -> Option<&'static str> {
	TABLE
		.iter()
		.find(|(_, kinds)| kinds.contains(&kind))
		.map(|(category, _)| *category)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn every_declared_type_maps_back_to_its_category() {
		for (category, kinds) in categories() {
			for kind in kinds {
				assert_eq!(reverse_lookup(kind), Some(category), "{kind}");
			}
		}
	}

	#[test]
	fn unknown_strings_have_no_category() {
		assert_eq!(reverse_lookup("Filtro Pasa Banda"), None);
		assert_eq!(reverse_lookup(""), None);
		assert_eq!(reverse_lookup("Filtros"), None);
		assert_eq!(reverse_lookup("pasa bajo"), None);
	}

	#[test]
	fn labels_are_unique_across_categories() {
		let mut seen = std::collections::HashSet::new();
		for (_, kinds) in categories() {
			for kind in kinds {
				assert!(seen.insert(*kind), "{kind} listed twice");
			}
		}
	}

	#[test]
	fn categories_keep_declaration_order() {
		let names: Vec<_> = categories().map(|(c, _)| c).collect();
		assert_eq!(names.first(), Some(&"Filtros"));
		assert_eq!(names.last(), Some(&"Datos"));
		assert_eq!(names.len(), 6);
	}
}
