diesel::table! {
    ingredients (id) {
        id -> Int8,
        name -> Varchar,
    }
}

diesel::table! {
    recipe_ingredients (id) {
        id -> Int8,
        recipe_id -> Int8,
        ingredient_id -> Int8,
        quantity -> Nullable<Float8>,
        unit -> Nullable<Varchar>,
    }
}

diesel::table! {
    recipes (id) {
        id -> Int8,
        name -> Varchar,
        description -> Text,
        category -> Nullable<Varchar>,
    }
}

diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));

diesel::allow_tables_to_appear_in_same_query!(ingredients, recipe_ingredients, recipes,);
