use crate::models::{
    AlerteTable, BassinTable, ClientTable, DeviceTable, FermeTable, LotEventTable, LotTable,
    MesureTable, Table, UserTable, VenteTable,
};

pub struct SchemaManager {
    tables: Vec<Box<dyn Table>>,
}

impl SchemaManager {
    pub fn new(mut tables: Vec<Box<dyn Table>>) -> Self {
        Self::sort_tables(&mut tables);
        Self { tables }
    }

    fn sort_tables(tables: &mut Vec<Box<dyn Table>>) {
        let mut to_sort = std::mem::take(tables);
        let mut deps_list: Vec<_> = to_sort.iter().map(|t| t.dependencies()).collect();
        let mut sorted = Vec::with_capacity(to_sort.len());

        while !to_sort.is_empty() {
            let independent_indices: Vec<usize> = deps_list.iter().enumerate()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(i, _)| i)
                .collect();

            assert!(!independent_indices.is_empty(), "Circular dependency detected or unresolved dependencies exist.");

            for &index in independent_indices.iter().rev() {
                let table = to_sort.swap_remove(index);
                let _ = deps_list.swap_remove(index);
                sorted.push(table);
            }

            for deps in deps_list.iter_mut() {
                deps.retain(|dep_name| {
                    !sorted.iter().any(|resolved_table| resolved_table.name() == *dep_name)
                });
            }
        }

        *tables = sorted;
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }

    pub fn seed_schema(&self) -> Vec<String> {
        self.tables.iter().filter_map(|table| table.seed()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![
            Box::new(UserTable),
            Box::new(FermeTable),
            Box::new(BassinTable),
            Box::new(LotTable),
            Box::new(LotEventTable),
            Box::new(ClientTable),
            Box::new(VenteTable),
            Box::new(MesureTable),
            Box::new(AlerteTable),
            Box::new(DeviceTable),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTable {
        name: &'static str,
        dependencies: Vec<&'static str>,
    }

    impl Table for MockTable {
        fn name(&self) -> &'static str {
            self.name
        }

        fn create(&self) -> String {
            format!("CREATE TABLE {};", self.name)
        }

        fn dispose(&self) -> String {
            format!("DROP TABLE {};", self.name)
        }

        fn dependencies(&self) -> Vec<&'static str> {
            self.dependencies.clone()
        }
    }

    fn mock(name: &'static str, dependencies: Vec<&'static str>) -> Box<dyn Table> {
        Box::new(MockTable { name, dependencies })
    }

    fn position(statements: &[String], name: &str) -> usize {
        statements
            .iter()
            .position(|s| s.ends_with(&format!(" {name};")))
            .unwrap()
    }

    #[test]
    fn test_correct_creation_order() {
        let manager = SchemaManager::new(vec![
            mock("ventes", vec!["lots", "clients"]),
            mock("lots", vec!["bassins"]),
            mock("clients", vec!["users"]),
            mock("bassins", vec![]),
            mock("users", vec![]),
        ]);
        let statements = manager.create_schema();

        assert!(position(&statements, "bassins") < position(&statements, "lots"));
        assert!(position(&statements, "users") < position(&statements, "clients"));
        assert!(position(&statements, "lots") < position(&statements, "ventes"));
        assert!(position(&statements, "clients") < position(&statements, "ventes"));
        assert_eq!(statements[4], "CREATE TABLE ventes;");
    }

    #[test]
    fn test_dispose_in_reverse_order() {
        let manager = SchemaManager::new(vec![
            mock("lot_events", vec!["lots"]),
            mock("lots", vec!["bassins"]),
            mock("bassins", vec![]),
        ]);

        assert_eq!(
            manager.dispose_schema(),
            vec![
                "DROP TABLE lot_events;",
                "DROP TABLE lots;",
                "DROP TABLE bassins;"
            ]
        );
    }

    #[test]
    fn test_default_schema_seeds_farm_row() {
        let manager = SchemaManager::default();
        let seeds = manager.seed_schema();

        assert_eq!(seeds.len(), 1);
        assert!(seeds[0].contains("INSERT OR IGNORE INTO ferme"));
    }
}
