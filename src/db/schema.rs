table! {
    activities (id) {
        id -> Integer,
        name -> Text,
        parent_id -> Nullable<Integer>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    buildings (id) {
        id -> Integer,
        address -> Text,
        latitude -> Double,
        longitude -> Double,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    organizations (id) {
        id -> Integer,
        name -> Text,
        phone_numbers -> Text,
        building_id -> Integer,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    organization_activity (organization_id, activity_id) {
        organization_id -> Integer,
        activity_id -> Integer,
    }
}

joinable!(organizations -> buildings (building_id));
joinable!(organization_activity -> organizations (organization_id));
joinable!(organization_activity -> activities (activity_id));

allow_tables_to_appear_in_same_query!(activities, buildings, organizations, organization_activity,);
